// [libs/infra/db-turso/src/repositories/feature/queries.rs]
/*!
 * =================================================================
 * APARATO: FEATURE ROW SQL STORE (V3.3 - STATE MACHINE SQL)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS ATÓMICAS DE LA MÁQUINA DE ESTADOS
 *
 * # Mathematical Proof (CAS Transitions):
 * Toda transición porta su guardia de estado en el WHERE; la afectación
 * de 0 filas certifica que otro worker ganó la carrera. La propiedad de
 * una fila 'building' es por tanto una operación atómica indivisible.
 * =================================================================
 */

// --- ESTRATO DE SIEMBRA Y RECLAMACIÓN ---

/// Siembra la fila en estado pending; re-siembra es un no-op.
pub const ENSURE_PENDING: &str = r#"
    INSERT OR IGNORE INTO domain_extraction_features
        (campaign_id, domain_id, processing_state, updated_at)
    VALUES (?1, ?2, 'pending', ?3)
"#;

/// Candidatas a reclamación, más antiguas primero.
pub const FIND_PENDING: &str = r#"
    SELECT domain_id FROM domain_extraction_features
    WHERE campaign_id = ?1 AND processing_state = 'pending'
    ORDER BY updated_at ASC
    LIMIT ?2
"#;

/// Reclamación atómica pending → building (compare-and-set).
pub const CLAIM_ROW: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'building', updated_at = ?1
    WHERE campaign_id = ?2 AND domain_id = ?3 AND processing_state = 'pending'
"#;

// --- ESTRATO DE SELLADO Y FALLO ---

/// Upsert idempotente del agregado: el conflicto incrementa attempt_count
/// y refresca todos los campos mutables, limpiando last_error.
pub const COMPLETE_ROW: &str = r#"
    INSERT INTO domain_extraction_features
        (campaign_id, domain_id, processing_state, attempt_count, last_error,
         kw_unique_count, kw_total_occurrences, kw_weight_sum, top3_json,
         signal_distribution_json, content_richness_score, page_archetype,
         is_parked, parked_confidence, feature_vector_json,
         extraction_version, keyword_dictionary_version,
         scoring_profile_snapshot_id, is_stale_score, lead_score, updated_at)
    VALUES (?1, ?2, 'ready', 1, NULL, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 0, ?16, ?17)
    ON CONFLICT (campaign_id, domain_id) DO UPDATE SET
        processing_state = 'ready',
        attempt_count = domain_extraction_features.attempt_count + 1,
        last_error = NULL,
        kw_unique_count = excluded.kw_unique_count,
        kw_total_occurrences = excluded.kw_total_occurrences,
        kw_weight_sum = excluded.kw_weight_sum,
        top3_json = excluded.top3_json,
        signal_distribution_json = excluded.signal_distribution_json,
        content_richness_score = excluded.content_richness_score,
        page_archetype = excluded.page_archetype,
        is_parked = excluded.is_parked,
        parked_confidence = excluded.parked_confidence,
        feature_vector_json = excluded.feature_vector_json,
        extraction_version = excluded.extraction_version,
        keyword_dictionary_version = excluded.keyword_dictionary_version,
        scoring_profile_snapshot_id = excluded.scoring_profile_snapshot_id,
        is_stale_score = 0,
        lead_score = excluded.lead_score,
        updated_at = excluded.updated_at
"#;

/// Transición building → error con rastro forense del fallo.
pub const FAIL_ROW: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'error',
        last_error = ?1,
        attempt_count = attempt_count + 1,
        updated_at = ?2
    WHERE campaign_id = ?3 AND domain_id = ?4 AND processing_state = 'building'
"#;

// --- ESTRATO DEL RECONCILIADOR ---

/// Zombies: filas building cuya actualización excede el umbral.
pub const FIND_STUCK_BUILDING: &str = r#"
    SELECT campaign_id, domain_id FROM domain_extraction_features
    WHERE processing_state = 'building' AND updated_at < ?1
    ORDER BY updated_at ASC
    LIMIT ?2
"#;

/// Reset dirigido por identidad de fila (jamás por predicado amplio).
pub const RESET_STUCK_ROW: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'pending', updated_at = ?1
    WHERE campaign_id = ?2 AND domain_id = ?3 AND processing_state = 'building'
"#;

/// Re-encolado de fallos y obsoletos bajo el presupuesto de reintentos.
pub const REQUEUE_FAILED: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'pending', updated_at = ?1
    WHERE campaign_id = ?2
      AND processing_state IN ('error', 'stale')
      AND attempt_count < ?3
"#;

/// Variante global del re-encolado para la pasada del reconciliador.
pub const REQUEUE_FAILED_GLOBAL: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'pending', updated_at = ?1
    WHERE processing_state IN ('error', 'stale')
      AND attempt_count < ?2
"#;

// --- ESTRATO DE SCORING ---

/// Marca de obsolescencia de score sobre filas ready con snapshot distinto.
pub const MARK_STALE_SCORES: &str = r#"
    UPDATE domain_extraction_features
    SET is_stale_score = 1, updated_at = ?1
    WHERE campaign_id = ?2
      AND processing_state = 'ready'
      AND (scoring_profile_snapshot_id IS NULL OR scoring_profile_snapshot_id != ?3)
"#;

/// Variante sin snapshot vigente: toda fila ready queda obsoleta.
pub const MARK_ALL_STALE_SCORES: &str = r#"
    UPDATE domain_extraction_features
    SET is_stale_score = 1, updated_at = ?1
    WHERE campaign_id = ?2 AND processing_state = 'ready'
"#;

/// Obsolescencia de extracción: ready → stale ante versión superior.
pub const MARK_STALE_EXTRACTION: &str = r#"
    UPDATE domain_extraction_features
    SET processing_state = 'stale', updated_at = ?1
    WHERE campaign_id = ?2
      AND processing_state = 'ready'
      AND extraction_version < ?3
"#;

pub const FIND_STALE_SCORES: &str = r#"
    SELECT domain_id, feature_vector_json FROM domain_extraction_features
    WHERE campaign_id = ?1 AND processing_state = 'ready' AND is_stale_score = 1
    LIMIT ?2
"#;

/// Sellado del re-score bajo el snapshot activo.
pub const WRITE_SCORE: &str = r#"
    UPDATE domain_extraction_features
    SET lead_score = ?1,
        scoring_profile_snapshot_id = ?2,
        is_stale_score = 0,
        updated_at = ?3
    WHERE campaign_id = ?4 AND domain_id = ?5
"#;

// --- ESTRATO DE LECTURA ---

pub const COUNT_BY_STATE: &str = r#"
    SELECT COUNT(*) FROM domain_extraction_features
    WHERE campaign_id = ?1 AND processing_state = ?2
"#;

pub const GET_ROW: &str = r#"
    SELECT processing_state, attempt_count, last_error, kw_unique_count,
           kw_total_occurrences, kw_weight_sum, top3_json, signal_distribution_json,
           content_richness_score, page_archetype, is_parked, parked_confidence,
           feature_vector_json, extraction_version, keyword_dictionary_version,
           scoring_profile_snapshot_id, is_stale_score, lead_score, updated_at
    FROM domain_extraction_features
    WHERE campaign_id = ?1 AND domain_id = ?2
"#;

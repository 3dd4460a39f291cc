// [libs/infra/db-turso/src/schema.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V3.4 - LEAD PIPELINE STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PIPELINE TABLES: Campañas, dominios generados, resultados de sondeo,
 *    features de extracción, snapshots de scoring y ledger de fases.
 * 2. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 3. PERFORMANCE: Índices de aceleración para el reconciliador y el
 *    selector por cursor.
 * =================================================================
 */

use libsql::Connection;
use tracing::{debug, info, instrument, warn};

use crate::errors::DbError;

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_CAMPAIGNS", r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'draft',
            mode TEXT NOT NULL DEFAULT 'full_pipeline',
            created_at TEXT NOT NULL,
            completed_at TEXT
        );
    "#),
    ("TABLE_GENERATED_DOMAINS", r#"
        CREATE TABLE IF NOT EXISTS generated_domains (
            id TEXT NOT NULL,
            campaign_id TEXT NOT NULL,
            offset_index INTEGER NOT NULL,
            domain_name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, offset_index)
        );
    "#),
    ("TABLE_DNS_VALIDATION_RESULTS", r#"
        CREATE TABLE IF NOT EXISTS dns_validation_results (
            campaign_id TEXT NOT NULL,
            domain_name TEXT NOT NULL,
            resolver_used TEXT,
            status TEXT NOT NULL,
            ips_json TEXT NOT NULL DEFAULT '[]',
            duration_ms INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            validated_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, domain_name)
        );
    "#),
    ("TABLE_HTTP_KEYWORD_RESULTS", r#"
        CREATE TABLE IF NOT EXISTS http_keyword_results (
            campaign_id TEXT NOT NULL,
            domain_name TEXT NOT NULL,
            final_url TEXT,
            status_code INTEGER NOT NULL DEFAULT 0,
            is_success INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            headers_json TEXT NOT NULL DEFAULT '{}',
            content_hash TEXT,
            extracted_title TEXT,
            extracted_snippet TEXT,
            duration_ms INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            proxy_id TEXT,
            validated_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, domain_name)
        );
    "#),
    ("TABLE_DOMAIN_EXTRACTION_FEATURES", r#"
        CREATE TABLE IF NOT EXISTS domain_extraction_features (
            campaign_id TEXT NOT NULL,
            domain_id TEXT NOT NULL,
            processing_state TEXT NOT NULL DEFAULT 'pending',
            attempt_count INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            kw_unique_count INTEGER NOT NULL DEFAULT 0,
            kw_total_occurrences INTEGER NOT NULL DEFAULT 0,
            kw_weight_sum REAL NOT NULL DEFAULT 0,
            top3_json TEXT NOT NULL DEFAULT '[]',
            signal_distribution_json TEXT NOT NULL DEFAULT '{}',
            content_richness_score REAL NOT NULL DEFAULT 0,
            page_archetype TEXT NOT NULL DEFAULT 'unknown',
            is_parked INTEGER NOT NULL DEFAULT 0,
            parked_confidence REAL NOT NULL DEFAULT 0,
            feature_vector_json TEXT NOT NULL DEFAULT '{}',
            extraction_version INTEGER NOT NULL DEFAULT 1,
            keyword_dictionary_version INTEGER NOT NULL DEFAULT 1,
            scoring_profile_snapshot_id TEXT,
            is_stale_score INTEGER NOT NULL DEFAULT 0,
            lead_score REAL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, domain_id)
        );
    "#),
    ("TABLE_SCORING_PROFILE_SNAPSHOTS", r#"
        CREATE TABLE IF NOT EXISTS scoring_profile_snapshots (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            profile_version INTEGER NOT NULL,
            feature_weights_json TEXT NOT NULL DEFAULT '{}',
            algorithm_version INTEGER NOT NULL DEFAULT 1,
            parameters_json TEXT NOT NULL DEFAULT 'null',
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            replaced_at TEXT,
            replaced_by TEXT
        );
    "#),
    ("TABLE_PHASE_EXECUTIONS", r#"
        CREATE TABLE IF NOT EXISTS phase_executions (
            campaign_id TEXT NOT NULL,
            phase TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            cursor_value INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, phase)
        );
    "#),
    ("TABLE_QUERY_PERFORMANCE_METRICS", r#"
        CREATE TABLE IF NOT EXISTS query_performance_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            operation TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );
    "#),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Asegura que las tablas existentes se adapten a las nuevas capacidades.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    // --- EVIDENCIA DE KEYWORDS Y MICROCRAWL (V3.2) ---
    ("HTTP_CONTENT_BYTES",
        "ALTER TABLE http_keyword_results ADD COLUMN content_bytes INTEGER NOT NULL DEFAULT 0"),
    ("HTTP_KEYWORD_HITS",
        "ALTER TABLE http_keyword_results ADD COLUMN keyword_hits_json TEXT NOT NULL DEFAULT '[]'"),
    ("HTTP_MICROCRAWL",
        "ALTER TABLE http_keyword_results ADD COLUMN microcrawl_json TEXT"),
    ("HTTP_IS_PARKED",
        "ALTER TABLE http_keyword_results ADD COLUMN is_parked INTEGER NOT NULL DEFAULT 0"),
    ("HTTP_PARKED_CONFIDENCE",
        "ALTER TABLE http_keyword_results ADD COLUMN parked_confidence REAL NOT NULL DEFAULT 0"),
];

/**
 * ESTRATO 3: ACELERACIÓN (Índices de Despacho)
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_DOMAINS_CAMPAIGN_NAME",
        "CREATE INDEX IF NOT EXISTS idx_generated_domains_campaign_name ON generated_domains (campaign_id, domain_name)"),
    ("IDX_FEATURES_CAMPAIGN_STATE",
        "CREATE INDEX IF NOT EXISTS idx_features_campaign_state ON domain_extraction_features (campaign_id, processing_state)"),
    ("IDX_FEATURES_STATE_UPDATED",
        "CREATE INDEX IF NOT EXISTS idx_features_state_updated ON domain_extraction_features (processing_state, updated_at)"),
    ("IDX_SNAPSHOTS_CAMPAIGN_ACTIVE",
        "CREATE INDEX IF NOT EXISTS idx_snapshots_campaign_active ON scoring_profile_snapshots (campaign_id, is_active)"),
    ("IDX_DNS_RESULTS_CAMPAIGN_STATUS",
        "CREATE INDEX IF NOT EXISTS idx_dns_results_campaign_status ON dns_validation_results (campaign_id, status)"),
];

/**
 * Aplica el esquema soberano completo de forma idempotente.
 *
 * Las sentencias son re-ejecutables en caliente; un fallo individual de
 * índice se degrada a warning para tolerar migraciones parciales previas.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<(), DbError> {
    info!("🏗️  [SCHEMA]: Applying sovereign schema strata...");

    for (table_label, create_statement) in TACTICAL_TABLES {
        database_connection.execute(create_statement, ()).await?;
        debug!("   🧱 [SCHEMA]: {} solidified.", table_label);
    }

    // Las mutaciones de columna fallan con 'duplicate column' en esquemas ya
    // evolucionados; la degradación a debug preserva la idempotencia.
    for (evolution_label, alter_statement) in EVOLUTIONARY_STRATA {
        if let Err(evolution_fault) = database_connection.execute(alter_statement, ()).await {
            debug!("   🧬 [SCHEMA]: Evolution {} skipped: {}", evolution_label, evolution_fault);
        }
    }

    for (index_label, index_statement) in ACCELERATION_INDEXES {
        if let Err(index_fault) = database_connection.execute(index_statement, ()).await {
            warn!("   ⚠️ [SCHEMA]: Index {} skipped: {}", index_label, index_fault);
        }
    }

    info!("✅ [SCHEMA]: Sovereign schema levelized.");
    Ok(())
}

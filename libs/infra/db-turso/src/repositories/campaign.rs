// [libs/infra/db-turso/src/repositories/campaign.rs]
/*!
 * =================================================================
 * APARATO: CAMPAIGN REPOSITORY (V3.2 - MONOTONIC LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA PERSISTIDO DE CAMPAÑAS
 * =================================================================
 */

use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use tracing::{info, instrument};
use uuid::Uuid;

use dominion_domain_models::campaign::{Campaign, CampaignMode, CampaignState};

use crate::errors::DbError;

const INSERT_CAMPAIGN: &str = r#"
    INSERT INTO campaigns (id, name, state, mode, created_at, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, NULL)
"#;

const GET_CAMPAIGN: &str = r#"
    SELECT id, name, state, mode, created_at, completed_at
    FROM campaigns WHERE id = ?1
"#;

/// Guardia de estado: la transición sólo procede desde el estado declarado.
const TRANSITION_CAMPAIGN: &str = r#"
    UPDATE campaigns
    SET state = ?1,
        completed_at = CASE WHEN ?1 IN ('completed', 'failed') THEN ?2 ELSE completed_at END
    WHERE id = ?3 AND state = ?4
"#;

pub struct CampaignRepository {
    database_connection: Connection,
}

impl CampaignRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self, campaign))]
    pub async fn create(&self, campaign: &Campaign) -> Result<(), DbError> {
        let mode_label = serde_json::to_value(campaign.mode)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "full_pipeline".to_string());

        self.database_connection
            .execute(
                INSERT_CAMPAIGN,
                params![
                    campaign.id.to_string(),
                    campaign.name.clone(),
                    campaign.state.as_str(),
                    mode_label,
                    campaign.created_at.to_rfc3339()
                ],
            )
            .await?;

        info!("🗺️  [CAMPAIGN]: Campaign [{}] registered in draft strata.", campaign.id);
        Ok(())
    }

    pub async fn get(&self, campaign_id: Uuid) -> Result<Campaign, DbError> {
        let mut rows = self
            .database_connection
            .query(GET_CAMPAIGN, params![campaign_id.to_string()])
            .await?;

        let row = rows.next().await?.ok_or(DbError::CampaignNotFound)?;
        map_campaign_row(&row)
    }

    /// Transición con guardia de estado (compare-and-set sobre el autómata).
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        campaign_id: Uuid,
        from: CampaignState,
        to: CampaignState,
    ) -> Result<(), DbError> {
        if !from.is_transition_allowed(to) {
            return Err(DbError::InvalidStateTransition);
        }

        let rows_affected = self
            .database_connection
            .execute(
                TRANSITION_CAMPAIGN,
                params![
                    to.as_str(),
                    Utc::now().to_rfc3339(),
                    campaign_id.to_string(),
                    from.as_str()
                ],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::InvalidStateTransition);
        }

        info!(
            "🧭 [CAMPAIGN]: Campaign [{}] transitioned {} → {}.",
            campaign_id,
            from.as_str(),
            to.as_str()
        );
        Ok(())
    }
}

fn map_campaign_row(row: &libsql::Row) -> Result<Campaign, DbError> {
    let id_text: String = row.get(0)?;
    let name: String = row.get(1)?;
    let state_text: String = row.get(2)?;
    let mode_text: String = row.get(3)?;
    let created_at_text: String = row.get(4)?;
    // NULL se degrada a None vía .ok().
    let completed_at_text: Option<String> = row.get::<String>(5).ok();

    Ok(Campaign {
        id: Uuid::parse_str(&id_text)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        name,
        state: CampaignState::parse(&state_text)
            .ok_or_else(|| DbError::MappingError(format!("unknown state {}", state_text)))?,
        mode: serde_json::from_value(serde_json::Value::String(mode_text))
            .unwrap_or(CampaignMode::FullPipeline),
        created_at: parse_timestamp(&created_at_text)?,
        completed_at: completed_at_text.map(|text| parse_timestamp(&text)).transpose()?,
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|fault| DbError::MappingError(format!("timestamp {}: {}", raw, fault)))
}

// [apps/orchestrator/src/main.rs]
/*!
 * =================================================================
 * APARATO: DOMINION ORCHESTRATOR BINARY (V3.6 - CAMPAIGN CONDUCTOR)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L4)
 * RESPONSABILIDAD: IGNICIÓN DEL DUCTO, SEÑALES Y SUBCOMANDOS OPERATIVOS
 * =================================================================
 */

mod bootstrap;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use dominion_core_gen::{config_hash, DomainGenerator};
use dominion_domain_features::FeatureBuilderParams;
use dominion_domain_models::campaign::Campaign;
use dominion_domain_models::config::{MicrocrawlConfig, RichnessConfig, StealthPhaseConfig};
use dominion_domain_models::generation::{DomainGenerationParams, PatternType};
use dominion_domain_models::persona::HttpPersonaConfig;
use dominion_domain_pipeline::{
    CampaignBlueprint, PhaseEventBroadcaster, PipelineOrchestrator, Reconciler, SnapshotLifecycle,
    TracingMetricsSink,
};
use dominion_infra_db::{
    CampaignRepository, FeatureRepository, SnapshotRepository, TursoClient,
};

#[derive(Parser)]
#[command(
    name = "dominion-orchestrator",
    about = "Conductor del ducto de prospección de dominios",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Conduce una campaña completa: generación → dns → http → features → scoring.
    Run {
        #[arg(long)]
        campaign_name: String,
        #[arg(long, value_parser = parse_pattern, default_value = "prefix")]
        pattern: PatternType,
        #[arg(long, default_value_t = 0)]
        prefix_len: u32,
        #[arg(long, default_value_t = 0)]
        suffix_len: u32,
        #[arg(long, default_value = "abcdefghijklmnopqrstuvwxyz")]
        charset: String,
        #[arg(long, default_value = "")]
        constant: String,
        #[arg(long)]
        tld: String,
        /// Diccionario `forma[:peso[:valor]]` separado por comas.
        #[arg(long, default_value = "")]
        keywords: String,
    },
    /// Materializa un lote de dominios sin tocar el Ledger (inspección).
    Generate {
        #[arg(long, value_parser = parse_pattern, default_value = "prefix")]
        pattern: PatternType,
        #[arg(long, default_value_t = 0)]
        prefix_len: u32,
        #[arg(long, default_value_t = 0)]
        suffix_len: u32,
        #[arg(long, default_value = "abcdefghijklmnopqrstuvwxyz")]
        charset: String,
        #[arg(long, default_value = "")]
        constant: String,
        #[arg(long)]
        tld: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
    /// Ejecuta una pasada del reconciliador de filas estancadas.
    Reconcile {
        #[arg(long, default_value_t = 1_800)]
        older_than_secs: u64,
        #[arg(long, default_value_t = 200)]
        batch_size: usize,
    },
    /// Re-score de filas obsoletas bajo el snapshot activo de la campaña.
    Rescore {
        #[arg(long)]
        campaign_id: Uuid,
    },
}

fn parse_pattern(raw: &str) -> Result<PatternType, String> {
    match raw {
        "prefix" => Ok(PatternType::Prefix),
        "suffix" => Ok(PatternType::Suffix),
        "both" => Ok(PatternType::Both),
        other => Err(format!("unknown pattern '{}'", other)),
    }
}

async fn connect_ledger() -> anyhow::Result<TursoClient> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "dominion.db".to_string());
    let database_token = std::env::var("DATABASE_AUTH_TOKEN").ok();
    TursoClient::connect(&database_url, database_token)
        .await
        .context("ledger ignition failed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    dominion_shared_heimdall::init_tracing("dominion_orchestrator");

    let cli = Cli::parse();

    // Token de campaña cancelado por Ctrl-C.
    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 [SIGNAL]: Ctrl-C observed, cancelling in-flight work.");
            signal_token.cancel();
        }
    });

    match cli.command {
        Command::Run {
            campaign_name,
            pattern,
            prefix_len,
            suffix_len,
            charset,
            constant,
            tld,
            keywords,
        } => {
            let client = connect_ledger().await?;

            let generation = DomainGenerationParams {
                pattern,
                prefix_var_len: prefix_len,
                suffix_var_len: suffix_len,
                character_set: charset,
                constant_string: constant,
                tld,
            };
            info!(
                "🧬 [PATTERN]: Config hash {}.",
                config_hash(&generation).context("invalid generation params")?
            );

            // 1. REGISTRO DE LA CAMPAÑA
            let campaigns = CampaignRepository::new(client.get_connection()?);
            let campaign = Campaign::new_draft(campaign_name);
            campaigns.create(&campaign).await?;

            // 2. CONFIGURACIÓN INMUTABLE (una sola lectura del entorno)
            let pipeline_config = bootstrap::pipeline_config_from_env();
            let builder_params = FeatureBuilderParams {
                richness: RichnessConfig::from_env(),
                emit_experimental_extras: false,
            };
            let blueprint = CampaignBlueprint {
                campaign_id: campaign.id,
                generation,
                http_persona: HttpPersonaConfig::default(),
                dns_persona: bootstrap::dns_persona_from_env(),
                keywords: bootstrap::parse_keyword_dictionary(&keywords),
                dns_stealth: StealthPhaseConfig::dns_defaults(),
                http_stealth: StealthPhaseConfig::http_defaults(),
            };

            // 3. DAEMON RECONCILIADOR FUERA DE BANDA
            let reconciler = Arc::new(Reconciler::new(
                FeatureRepository::new(client.get_connection()?),
                pipeline_config.clone(),
                Arc::new(TracingMetricsSink),
            ));
            reconciler.spawn_daemon(cancellation_token.clone());

            // 4. CONDUCCIÓN DEL DUCTO
            let orchestrator = PipelineOrchestrator::new(
                client,
                bootstrap::dns_config_from_env(),
                bootstrap::http_config_from_env(),
                pipeline_config,
                builder_params,
                MicrocrawlConfig::from_env(),
                Arc::new(PhaseEventBroadcaster::default()),
                Arc::new(TracingMetricsSink),
                None,
            );
            orchestrator.run_campaign(&blueprint, &cancellation_token).await?;
            info!("🏁 [ORCHESTRATOR]: Campaign [{}] sealed.", campaign.id);
        }

        Command::Generate {
            pattern,
            prefix_len,
            suffix_len,
            charset,
            constant,
            tld,
            offset,
            count,
        } => {
            let generation = DomainGenerationParams {
                pattern,
                prefix_var_len: prefix_len,
                suffix_var_len: suffix_len,
                character_set: charset,
                constant_string: constant,
                tld,
            };
            let generator = DomainGenerator::new(&generation)?;
            println!("# total_combinations = {}", generator.total_combinations());
            println!("# config_hash = {}", config_hash(&generation)?);

            let (batch, next_offset) = generator.generate_batch(offset, count)?;
            for (index, domain) in batch.iter().enumerate() {
                println!("{:>12}  {}", offset + index as u64, domain);
            }
            println!("# next_offset = {}", next_offset);
        }

        Command::Reconcile { older_than_secs, batch_size } => {
            let client = connect_ledger().await?;
            let reconciler = Reconciler::new(
                FeatureRepository::new(client.get_connection()?),
                bootstrap::pipeline_config_from_env(),
                Arc::new(TracingMetricsSink),
            );
            let adjusted = reconciler
                .reconcile_stuck(std::time::Duration::from_secs(older_than_secs), batch_size)
                .await?;
            info!("♻️  [RECONCILE]: {} stuck rows returned to pending.", adjusted);
        }

        Command::Rescore { campaign_id } => {
            let client = connect_ledger().await?;
            let lifecycle = SnapshotLifecycle::new(
                SnapshotRepository::new(client.get_connection()?),
                FeatureRepository::new(client.get_connection()?),
            );
            let rescored = lifecycle.rescore(campaign_id).await?;
            info!("🧮 [RESCORE]: {} rows re-sealed.", rescored);
        }
    }

    Ok(())
}

use entity_enricher_lib::{config, input_loader, logger, output};
use entity_enricher_lib::config::{PipelineConfig, ProviderConfig};
use entity_enricher_lib::exclusion_patterns::{ExclusionPattern, ExclusionSet, PATTERNS_VERSION};
use entity_enricher_lib::extraction_client::HttpLlmTransport;
use entity_enricher_lib::language::{HttpTranslator, Translator, WhatlangDetector};
use entity_enricher_lib::{
    EntitySearchOrchestrator, ExtractionClient, QueryTemplate, RateWindow, SearchEngine,
    SearchFailurePolicy, TextNormalizer,
};

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use log::{info, warn};

#[derive(Parser)]
#[command(name = "entity_enricher", about = "Search, clean and LLM-extract information for sampled table entities")]
struct Cli {
    /// Input table (.csv or .xlsx)
    #[arg(short, long)]
    input: PathBuf,

    /// Column holding the entities
    #[arg(short, long)]
    column: String,

    /// Query template, e.g. "Get the email of {Company}"
    #[arg(short, long)]
    template: String,

    /// Number of entities to sample
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Write results CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extra exclusion regex applied during cleaning (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Keep entities whose search failed as "Search failed" rows
    #[arg(long)]
    keep_failed: bool,

    #[command(flatten)]
    providers: ProviderConfig,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    info!("Starting entity enrichment...");

    let providers = &cli.providers;
    let pipeline = PipelineConfig::default();

    // 1. Validate inputs before any network traffic
    let table = input_loader::load_table(&cli.input)?;
    let template = QueryTemplate::new(cli.template.as_str(), cli.column.as_str())?;

    // 2. Cleaning stack
    let extra: Vec<ExclusionPattern> = cli
        .exclude
        .iter()
        .enumerate()
        .map(|(i, p)| ExclusionPattern::new(format!("cli_{}", i + 1), p.as_str()))
        .collect();
    let exclusions = ExclusionSet::builtin()?.extended(extra)?;
    info!("Cleaning with {} exclusion patterns (list v{})", exclusions.patterns().len(), PATTERNS_VERSION);

    let translator: Option<Box<dyn Translator>> = match &providers.translate_api_url {
        Some(url) => {
            let http = HttpTranslator::new(url.as_str(), config::TRANSLATE_TIMEOUT)?;
            Some(Box::new(http) as Box<dyn Translator>)
        }
        None => {
            warn!("TRANSLATE_API_URL not set; non-{} text will not be translated", pipeline.canonical_language);
            None
        }
    };
    let normalizer = TextNormalizer::new(
        Box::new(WhatlangDetector),
        translator,
        exclusions,
        pipeline.canonical_language.as_str(),
    );

    // 3. Search phase
    let limiter = Arc::new(RateWindow::new(pipeline.rate_limit_calls, pipeline.rate_limit_period));
    let search_engine = SearchEngine::new(
        providers.search_api_url.as_str(),
        providers.search_api_key.as_str(),
        providers.search_engine_url.as_str(),
        pipeline.search_timeout,
        limiter,
    )?;

    let policy = if cli.keep_failed { SearchFailurePolicy::Placeholder } else { SearchFailurePolicy::Skip };
    let orchestrator = EntitySearchOrchestrator::new(Box::new(search_engine), normalizer)
        .with_entity_delay(pipeline.entity_delay)
        .with_failure_policy(policy);

    let records = orchestrator.run(&table, &template, cli.sample_size)?;

    // 4. Extraction phase
    let transport = HttpLlmTransport::new(
        providers.llm_api_url.as_str(),
        providers.llm_api_key.as_str(),
        config::LLM_TIMEOUT,
    )?;
    let client = ExtractionClient::new(Box::new(transport))
        .with_model(providers.llm_model.as_str())
        .with_record_delay(pipeline.record_delay);

    let results = client.extract(records);
    let extracted = results.iter().filter(|r| r.outcome.is_success()).count();

    // 5. Output
    match &cli.output {
        Some(path) => {
            output::write_results(File::create(path)?, &results)?;
            info!("Results written to {:?}", path);
        }
        None => output::write_results(io::stdout().lock(), &results)?,
    }

    info!("Enrichment completed: {} / {} entities extracted.", extracted, results.len());
    Ok(())
}

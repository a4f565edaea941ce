use std::sync::Arc;
use std::time::Duration;

use entity_enricher_lib::exclusion_patterns::ExclusionSet;
use entity_enricher_lib::extraction_client::LlmReply;
use entity_enricher_lib::input_loader::read_csv;
use entity_enricher_lib::testing::{FixedDetector, ManualClock, ScriptedSearch, ScriptedTransport};
use entity_enricher_lib::{
    EntitySearchOrchestrator, ExtractionClient, ExtractionOutcome, QueryTemplate, TextNormalizer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn english_normalizer() -> TextNormalizer {
    TextNormalizer::new(
        Box::new(FixedDetector::new(Some("en"))),
        None,
        ExclusionSet::builtin().unwrap(),
        "en",
    )
}

fn generation(text: &str) -> Result<LlmReply, String> {
    Ok(LlmReply {
        status: 200,
        body: serde_json::json!({ "generations": [{ "text": text }] }).to_string(),
    })
}

fn search_for_all() -> ScriptedSearch {
    ScriptedSearch::new()
        .with_html("Get the email of Acme", "<div>Acme Corp</div><div>info@acme.example</div>")
        .with_html("Get the email of Globex", "<div>Globex Corporation</div><div>hank@globex.example</div>")
        .with_html("Get the email of Initech", "<div>Initech</div><div>bill@initech.example</div>")
}

#[test]
fn two_of_three_companies_are_searched_and_extracted() {
    let table = read_csv("Company\nAcme\nGlobex\nInitech\n".as_bytes()).unwrap();
    let template = QueryTemplate::new("Get the email of {Company}", "Company").unwrap();

    let search = search_for_all();
    let queries = search.queries();
    let clock = Arc::new(ManualClock::new());

    let orchestrator = EntitySearchOrchestrator::new(Box::new(search), english_normalizer())
        .with_clock(clock.clone());
    let records = orchestrator
        .run_with_rng(&table, &template, 2, &mut StdRng::seed_from_u64(2024))
        .unwrap();

    let queries = queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 2);
    assert_ne!(queries[0], queries[1]);
    for q in &queries {
        assert!(q.starts_with("Get the email of "));
        let entity = q.trim_start_matches("Get the email of ");
        assert!(["Acme", "Globex", "Initech"].contains(&entity));
    }
    assert_eq!(records.len(), 2);

    let transport = ScriptedTransport::new(vec![generation("first"), generation("second")]);
    let client = ExtractionClient::new(Box::new(transport)).with_clock(clock.clone());
    let results = client.extract(records);

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.prompt.is_empty()));
    assert_eq!(results[0].extracted_info(), "first");
    assert_eq!(results[1].extracted_info(), "second");
    assert_eq!(
        queries,
        results
            .iter()
            .map(|r| format!("Get the email of {}", r.entity))
            .collect::<Vec<_>>()
    );

    // Two entity delays followed by two record delays.
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(2),
            Duration::from_secs(1),
            Duration::from_secs(1)
        ]
    );
}

#[test]
fn record_text_is_tag_free_and_single_spaced() {
    let table = read_csv("Company\nAcme\nGlobex\nInitech\n".as_bytes()).unwrap();
    let template = QueryTemplate::new("Get the email of {Company}", "Company").unwrap();
    let orchestrator = EntitySearchOrchestrator::new(Box::new(search_for_all()), english_normalizer())
        .with_entity_delay(Duration::ZERO);

    let records = orchestrator
        .run_with_rng(&table, &template, 3, &mut StdRng::seed_from_u64(9))
        .unwrap();

    assert_eq!(records.len(), 3);
    for record in &records {
        let text = record.extracted_text.as_deref().unwrap();
        assert!(!text.contains('<') && !text.contains('>'), "tags in {:?}", text);
        assert!(!text.contains("  "), "double space in {:?}", text);
        assert!(text.contains(&record.entity));
    }
}

#[test]
fn provider_failure_still_yields_a_result_per_record() {
    let table = read_csv("Company\nAcme\n".as_bytes()).unwrap();
    let template = QueryTemplate::new("Get the email of {Company}", "Company").unwrap();
    let orchestrator = EntitySearchOrchestrator::new(Box::new(search_for_all()), english_normalizer())
        .with_entity_delay(Duration::ZERO);
    let records = orchestrator
        .run_with_rng(&table, &template, 1, &mut StdRng::seed_from_u64(1))
        .unwrap();

    let transport = ScriptedTransport::new(vec![Ok(LlmReply { status: 500, body: String::new() })]);
    let client = ExtractionClient::new(Box::new(transport)).with_record_delay(Duration::ZERO);
    let results = client.extract(records);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, ExtractionOutcome::HttpStatus(500));
    assert!(results[0].extracted_info().contains("500"));
}

//! Samples entities from the input table and turns each into a cleaned
//! search record, one entity at a time.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};

use crate::config::ENTITY_DELAY;
use crate::delay_manager::{self, Clock, SystemClock};
use crate::error::{EnrichError, Result};
use crate::html_reducer;
use crate::input_loader::InputTable;
use crate::query_template::QueryTemplate;
use crate::search_engine::WebSearch;
use crate::text_normalizer::TextNormalizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub entity: String,
    pub query: String,
    /// `None` only for placeholder records of failed searches.
    pub extracted_text: Option<String>,
}

/// What to do with an entity whose search returned nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchFailurePolicy {
    /// Drop the entity from the batch.
    #[default]
    Skip,
    /// Keep a record without text so the entity still shows up downstream.
    Placeholder,
}

/// Draws `sample_size` distinct entities uniformly at random, without replacement.
pub fn sample_entities<R: Rng + ?Sized>(
    table: &InputTable,
    column: &str,
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let values = table.column(column)?;
    if sample_size > values.len() {
        return Err(EnrichError::InsufficientData {
            requested: sample_size,
            available: values.len(),
        });
    }

    Ok(rand::seq::index::sample(rng, values.len(), sample_size)
        .into_iter()
        .map(|i| values[i].clone())
        .collect())
}

pub struct EntitySearchOrchestrator {
    search: Box<dyn WebSearch>,
    normalizer: TextNormalizer,
    clock: Arc<dyn Clock>,
    entity_delay: Duration,
    failure_policy: SearchFailurePolicy,
}

impl EntitySearchOrchestrator {
    pub fn new(search: Box<dyn WebSearch>, normalizer: TextNormalizer) -> Self {
        EntitySearchOrchestrator {
            search,
            normalizer,
            clock: Arc::new(SystemClock),
            entity_delay: ENTITY_DELAY,
            failure_policy: SearchFailurePolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_entity_delay(mut self, delay: Duration) -> Self {
        self.entity_delay = delay;
        self
    }

    pub fn with_failure_policy(mut self, policy: SearchFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn run(
        &self,
        table: &InputTable,
        template: &QueryTemplate,
        sample_size: usize,
    ) -> Result<Vec<SearchRecord>> {
        self.run_with_rng(table, template, sample_size, &mut rand::thread_rng())
    }

    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        table: &InputTable,
        template: &QueryTemplate,
        sample_size: usize,
        rng: &mut R,
    ) -> Result<Vec<SearchRecord>> {
        if !template.has_placeholder() {
            warn!(
                "Query template has no {} placeholder; every entity will use the same query",
                template.placeholder()
            );
        }

        let entities = sample_entities(table, template.column(), sample_size, rng)?;
        let total = entities.len();
        let mut records = Vec::with_capacity(total);

        for (i, entity) in entities.into_iter().enumerate() {
            let query = template.render(&entity);
            info!("Processing {} / {} : {}", i + 1, total, entity);

            match self.search.search(&query) {
                Some(html) => {
                    let text = self.clean(&entity, &html);
                    records.push(SearchRecord { entity, query, extracted_text: Some(text) });
                }
                None => match self.failure_policy {
                    SearchFailurePolicy::Skip => {
                        warn!("Search failed for '{}'; entity dropped from batch", entity);
                    }
                    SearchFailurePolicy::Placeholder => {
                        warn!("Search failed for '{}'; keeping placeholder record", entity);
                        records.push(SearchRecord { entity, query, extracted_text: None });
                    }
                },
            }

            delay_manager::pause(self.clock.as_ref(), self.entity_delay, "Entity Delay");
        }

        info!("Search phase complete: {} records from {} entities", records.len(), total);
        Ok(records)
    }

    fn clean(&self, entity: &str, html: &str) -> String {
        let reduced = html_reducer::reduce(html);
        match self.normalizer.normalize(&reduced) {
            Ok(text) => text,
            Err(e) => {
                warn!("Normalization failed for '{}': {}; keeping reduced text", entity, e);
                self.normalizer.fallback(&reduced)
            }
        }
    }
}

//! Indicator catalog administration
//!
//! Every successful change advances the iteration counter so that later
//! submissions are grouped with the catalog they were answered against.
//! Existing results are left alone; recomputation happens only on
//! submission deletion or an explicit compute call.

use crate::stores::{IndicatorRegistry, IterationCounter};
use ahp_common::events::{AhpEvent, EventBus, IterationChange};
use ahp_common::{Category, Error, Indicator, Iteration, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct CatalogService {
    registry: Arc<dyn IndicatorRegistry>,
    counter: Arc<dyn IterationCounter>,
    event_bus: EventBus,
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

impl CatalogService {
    pub fn new(
        registry: Arc<dyn IndicatorRegistry>,
        counter: Arc<dyn IterationCounter>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            counter,
            event_bus,
        }
    }

    pub async fn list(&self) -> Result<Vec<Indicator>> {
        self.registry.list_indicators().await
    }

    pub async fn add(&self, name: &str, description: &str, category: Category) -> Result<Indicator> {
        let indicator = Indicator::new(
            required("name", name)?,
            required("description", description)?,
            category,
        );
        let stored = self.registry.insert_indicator(indicator).await?;
        let iteration = self.advance(IterationChange::IndicatorAdded).await?;
        info!(name = %stored.name, %category, iteration, "Indicator added");
        Ok(stored)
    }

    pub async fn edit(
        &self,
        id: Uuid,
        name: &str,
        description: &str,
        category: Category,
    ) -> Result<Indicator> {
        let indicator = Indicator {
            id,
            name: required("name", name)?,
            description: required("description", description)?,
            category,
        };
        let stored = self.registry.update_indicator(indicator).await?;
        let iteration = self.advance(IterationChange::IndicatorEdited).await?;
        info!(%id, name = %stored.name, iteration, "Indicator edited");
        Ok(stored)
    }

    pub async fn remove(&self, id: Uuid) -> Result<Indicator> {
        let removed = self.registry.remove_indicator(id).await?;
        let iteration = self.advance(IterationChange::IndicatorRemoved).await?;
        info!(%id, name = %removed.name, iteration, "Indicator removed");
        Ok(removed)
    }

    pub async fn current_iteration(&self) -> Result<Iteration> {
        self.counter.current().await
    }

    /// Admin override of the iteration counter
    pub async fn set_iteration(&self, value: i64) -> Result<Iteration> {
        let value = Iteration::try_from(value)
            .map_err(|_| Error::InvalidInput(format!("Iteration must be non-negative, got {}", value)))?;
        let iteration = self.counter.set(value).await?;
        info!(iteration, "Iteration set manually");
        self.event_bus.emit_lossy(AhpEvent::IterationAdvanced {
            iteration,
            reason: IterationChange::Manual,
            timestamp: Utc::now(),
        });
        Ok(iteration)
    }

    async fn advance(&self, reason: IterationChange) -> Result<Iteration> {
        let iteration = self.counter.increment().await?;
        self.event_bus.emit_lossy(AhpEvent::IterationAdvanced {
            iteration,
            reason,
            timestamp: Utc::now(),
        });
        Ok(iteration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{AtomicIterationCounter, InMemoryCatalog};

    fn service(initial: Iteration) -> (CatalogService, EventBus) {
        let bus = EventBus::new(16);
        let service = CatalogService::new(
            Arc::new(InMemoryCatalog::new()),
            Arc::new(AtomicIterationCounter::new(initial)),
            bus.clone(),
        );
        (service, bus)
    }

    #[tokio::test]
    async fn test_each_change_advances_iteration() {
        let (service, bus) = service(4);
        let mut rx = bus.subscribe();

        let a = service.add("ROE", "Return on equity", Category::FinancialEconomic).await.unwrap();
        assert_eq!(service.current_iteration().await.unwrap(), 5);
        service
            .edit(a.id, "ROA", "Return on assets", Category::FinancialEconomic)
            .await
            .unwrap();
        service.remove(a.id).await.unwrap();
        assert_eq!(service.current_iteration().await.unwrap(), 7);

        let reasons: Vec<_> = (0..3)
            .map(|_| match rx.try_recv().unwrap() {
                AhpEvent::IterationAdvanced { reason, .. } => reason,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                IterationChange::IndicatorAdded,
                IterationChange::IndicatorEdited,
                IterationChange::IndicatorRemoved
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_change_keeps_iteration() {
        let (service, _bus) = service(1);
        assert!(matches!(
            service.add("  ", "desc", Category::SocialEnvironmental).await,
            Err(Error::InvalidInput(_))
        ));
        service.add("A", "desc", Category::SocialEnvironmental).await.unwrap();
        assert!(matches!(
            service.add("A", "again", Category::FinancialEconomic).await,
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            service.remove(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(service.current_iteration().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_set_iteration() {
        let (service, _bus) = service(10);
        assert_eq!(service.set_iteration(3).await.unwrap(), 3);
        assert!(matches!(
            service.set_iteration(-1).await,
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(service.current_iteration().await.unwrap(), 3);
    }
}

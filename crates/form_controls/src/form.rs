//! Search form built from the controls: turns committed values into a
//! listing filter and blocks submission on an inverted date range.

use std::sync::Arc;

use chrono::NaiveDate;
use client_core::SuggestionSearch;
use shared::{
    domain::is_carrier_scac,
    protocol::{RoutingType, ScheduleFilter, SortKey},
};
use thiserror::Error;

use crate::{
    date_range::{DateRange, DateRangeController, INVERTED_RANGE_MESSAGE},
    dates::{format_api, Clock},
    typeahead::{TypeaheadConfig, TypeaheadController},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{INVERTED_RANGE_MESSAGE} ({} > {})", format_api(*from), format_api(*to))]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

pub struct ScheduleForm {
    pub dates: DateRangeController,
    pub origin: TypeaheadController,
    pub destination: TypeaheadController,
    pub carrier: TypeaheadController,
    pub equipment: Option<String>,
    pub routing_type: Option<RoutingType>,
    pub sort: SortKey,
}

impl ScheduleForm {
    /// `port_config` drives both port fields; the carrier field reuses its
    /// timings with the SCAC shape as its code predicate.
    pub fn new(
        ports: Arc<dyn SuggestionSearch>,
        carriers: Arc<dyn SuggestionSearch>,
        clock: Arc<dyn Clock>,
        port_config: TypeaheadConfig,
    ) -> Self {
        let carrier_config = TypeaheadConfig {
            is_code: is_carrier_scac,
            ..port_config
        };
        Self {
            dates: DateRangeController::new(clock),
            origin: TypeaheadController::new(Arc::clone(&ports), port_config),
            destination: TypeaheadController::new(ports, port_config),
            carrier: TypeaheadController::new(carriers, carrier_config),
            equipment: None,
            routing_type: None,
            sort: SortKey::default(),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.dates.is_valid()
    }

    /// Filter from committed values only; text the user has typed but not
    /// committed is not sent.
    pub fn build_filter(&self) -> Result<ScheduleFilter, FormError> {
        let DateRange { from, to } = self.dates.range();
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(FormError::InvalidDateRange { from, to });
            }
        }
        Ok(ScheduleFilter {
            origin: self.origin.committed().map(str::to_string),
            destination: self.destination.committed().map(str::to_string),
            from,
            to,
            equipment: self
                .equipment
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_ascii_uppercase),
            routing_type: self.routing_type,
            carrier: self.carrier.committed().map(str::to_string),
            sort: self.sort,
        })
    }

    /// Pushes previously used filters into every control without starting
    /// lookups.
    pub fn restore(&mut self, filter: &ScheduleFilter) {
        self.dates.set_range(DateRange::new(filter.from, filter.to));
        self.origin.sync_committed(filter.origin.as_deref());
        self.destination.sync_committed(filter.destination.as_deref());
        self.carrier.sync_committed(filter.carrier.as_deref());
        self.equipment = filter.equipment.clone();
        self.routing_type = filter.routing_type;
        self.sort = filter.sort;
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;

use super::{shaped_path, AttributionModel, ModelKind};
use crate::{credit::CreditMap, journey::ConvertingJourney, navigation::NavigationFilter};

/// First-touch attribution on the normalized, filtered path.
/// An empty path credits the conversion channel.
#[derive(Debug, Clone)]
pub struct FirstTouch {
    filter: NavigationFilter,
}

impl FirstTouch {
    pub fn new(filter: NavigationFilter) -> Self {
        Self { filter }
    }
}

impl AttributionModel for FirstTouch {
    fn kind(&self) -> ModelKind {
        ModelKind::FirstTouch
    }

    fn attribute(&self, journey: &ConvertingJourney) -> CreditMap {
        let path = shaped_path(journey, Some(&self.filter));
        let winner = path.first().unwrap_or(&journey.conversion.channel);
        CreditMap::single(winner, journey.value())
    }
}

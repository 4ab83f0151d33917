use super::{shaped_path, AttributionModel, ModelKind};
use crate::{credit::CreditMap, journey::ConvertingJourney, navigation::NavigationFilter};

/// Last-touch attribution.
///
/// Without a filter this is the baseline: the conversion event's own
/// channel takes everything, whatever came before. With a filter, the last
/// pre-conversion touchpoint that survives it takes everything, falling
/// back to the conversion channel when none survives.
#[derive(Debug, Clone, Default)]
pub struct LastTouch {
    filter: Option<NavigationFilter>,
}

impl LastTouch {
    pub fn unfiltered() -> Self {
        Self { filter: None }
    }

    pub fn filtered(filter: NavigationFilter) -> Self {
        Self { filter: Some(filter) }
    }
}

impl AttributionModel for LastTouch {
    fn kind(&self) -> ModelKind {
        match self.filter {
            Some(_) => ModelKind::LastTouchFiltered,
            None => ModelKind::LastTouch,
        }
    }

    fn attribute(&self, journey: &ConvertingJourney) -> CreditMap {
        let value = journey.value();
        let Some(filter) = &self.filter else {
            return CreditMap::single(&journey.conversion.channel, value);
        };

        let path = shaped_path(journey, Some(filter));
        let winner = path.last().unwrap_or(&journey.conversion.channel);
        CreditMap::single(winner, value)
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Price-anchored overlay marker (order level, alert, position entry).
///
/// Markers widen the auto price range so they stay on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMarker {
    pub id: String,
    pub price: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl PriceMarker {
    #[must_use]
    pub fn new(id: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            price,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.id.is_empty() {
            return Err(ChartError::InvalidData(
                "price marker id must not be empty".to_owned(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "price marker `{}` price must be finite and > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Validates markers and keys them by id; a later duplicate id wins.
pub fn index_price_markers(
    markers: Vec<PriceMarker>,
) -> ChartResult<IndexMap<String, PriceMarker>> {
    let mut indexed = IndexMap::with_capacity(markers.len());
    for marker in markers {
        marker.validate()?;
        indexed.insert(marker.id.clone(), marker);
    }
    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::{PriceMarker, index_price_markers};

    #[test]
    fn later_duplicate_id_wins() {
        let indexed = index_price_markers(vec![
            PriceMarker::new("entry", 100.0),
            PriceMarker::new("stop", 90.0),
            PriceMarker::new("entry", 105.0),
        ])
        .expect("valid markers");
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed["entry"].price, 105.0);
    }

    #[test]
    fn rejects_non_positive_price() {
        assert!(index_price_markers(vec![PriceMarker::new("x", 0.0)]).is_err());
    }
}

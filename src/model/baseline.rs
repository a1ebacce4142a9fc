//! Majority-class reference model

use super::{labels, FeatureFrame, FeatureImportance, FundingModel};
use crate::error::{PipelineError, Result};

/// Always predicts the label seen most often during fitting. Useful as the
/// floor any real model has to beat.
#[derive(Debug, Clone)]
pub struct MajorityModel {
    target: String,
    majority: Option<bool>,
}

impl MajorityModel {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            majority: None,
        }
    }

    pub fn majority(&self) -> Option<bool> {
        self.majority
    }
}

impl FundingModel for MajorityModel {
    fn transform_fit(&mut self, frame: &FeatureFrame) -> Result<()> {
        let values: Vec<_> = frame.column(&self.target).into_iter().cloned().collect();
        let labels = labels(&values)?;
        let positives = labels.iter().filter(|&&l| l).count();
        self.majority = Some(positives * 2 > labels.len());
        Ok(())
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<bool>> {
        let majority = self
            .majority
            .ok_or_else(|| PipelineError::model("predict called before transform_fit"))?;
        Ok(vec![majority; frame.len()])
    }

    fn feat_imp(&self) -> Vec<FeatureImportance> {
        Vec::new()
    }
}

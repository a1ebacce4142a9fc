//! Model-training step
//!
//! The pipeline hands feature frames to a [`FundingModel`]: it fits on loans
//! posted after the listing-length baseline, then predicts and scores on a
//! later evaluation window.

pub mod baseline;
pub mod frame;
pub mod memory;

pub use baseline::MajorityModel;
pub use frame::FeatureFrame;
pub use memory::MemorySource;

use crate::error::{PipelineError, Result};
use crate::sql::{default_feature_columns, LoanQuery, RowFilter};
use crate::table::columns;
use crate::transform::DateWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Anything that can answer a feature query
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn load(&self, query: &LoanQuery) -> Result<FeatureFrame>;
}

/// A classifier predicting whether a listing expires unfunded
pub trait FundingModel {
    /// Prepare features and fit. The frame still carries the target column.
    fn transform_fit(&mut self, frame: &FeatureFrame) -> Result<()>;

    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<bool>>;

    fn confusion(&self, predicted: &[bool], actual: &[bool]) -> ConfusionMatrix {
        ConfusionMatrix::from_predictions(predicted, actual)
    }

    /// Features ranked by importance, most important first
    fn feat_imp(&self) -> Vec<FeatureImportance>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &[bool], actual: &[bool]) -> Self {
        let mut matrix = Self::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Which rows the model is trained and evaluated on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPlan {
    /// Always `database.table`; filled in when the configuration is loaded
    #[serde(skip, default = "default_table")]
    pub table: String,

    #[serde(default = "default_feature_columns")]
    pub columns: Vec<String>,

    /// Listing length that marks the baseline; training starts after the
    /// last loan listed for this many days
    #[serde(default = "default_baseline_days")]
    pub baseline_days: i64,

    #[serde(default = "default_train_before")]
    pub train_before: NaiveDate,

    #[serde(default = "default_evaluate")]
    pub evaluate: DateWindow,

    #[serde(default = "default_target")]
    pub target: String,
}

fn default_table() -> String {
    "loans".to_string()
}

fn default_baseline_days() -> i64 {
    45
}

fn default_train_before() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 3, 15).unwrap_or(NaiveDate::MIN)
}

fn default_evaluate() -> DateWindow {
    DateWindow::new(
        default_train_before(),
        NaiveDate::from_ymd_opt(2015, 5, 1).unwrap_or(NaiveDate::MIN),
    )
}

fn default_target() -> String {
    columns::EXPIRED.to_string()
}

impl Default for ModelPlan {
    fn default() -> Self {
        Self {
            table: default_table(),
            columns: default_feature_columns(),
            baseline_days: default_baseline_days(),
            train_before: default_train_before(),
            evaluate: default_evaluate(),
            target: default_target(),
        }
    }
}

impl ModelPlan {
    pub fn training_query(&self) -> LoanQuery {
        LoanQuery::new(self.table.clone())
            .with_columns(self.columns.clone())
            .with_filter(RowFilter::AfterPolicyBaseline {
                days_available: self.baseline_days,
                before: self.train_before,
            })
    }

    pub fn evaluation_query(&self) -> LoanQuery {
        LoanQuery::new(self.table.clone())
            .with_columns(self.columns.clone())
            .with_filter(RowFilter::PostedBetween(self.evaluate))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub train_rows: usize,
    pub eval_rows: usize,
    pub confusion: ConfusionMatrix,
    pub importances: Vec<FeatureImportance>,
}

/// Interpret target values as labels
pub fn labels(values: &[Value]) -> Result<Vec<bool>> {
    values
        .iter()
        .map(|value| match value {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_f64().is_some_and(|x| x != 0.0)),
            Value::String(s) if matches!(s.as_str(), "true" | "t" | "1") => Ok(true),
            Value::String(s) if matches!(s.as_str(), "false" | "f" | "0") => Ok(false),
            other => Err(PipelineError::model(format!(
                "target value {other} is not a label"
            ))),
        })
        .collect()
}

/// Fit on the training query, then predict and score the evaluation query
pub async fn run_model<S, M>(source: &S, model: &mut M, plan: &ModelPlan) -> Result<ModelReport>
where
    S: FeatureSource + ?Sized,
    M: FundingModel + ?Sized,
{
    if !plan.columns.contains(&plan.target) {
        return Err(PipelineError::model(format!(
            "target column '{}' is not among the selected columns",
            plan.target
        )));
    }

    let train = source.load(&plan.training_query()).await?;
    info!("Loaded {} training rows", train.len());
    if train.is_empty() {
        return Err(PipelineError::model("training query returned no rows"));
    }
    model.transform_fit(&train)?;

    let mut eval = source.load(&plan.evaluation_query()).await?;
    info!("Loaded {} evaluation rows", eval.len());
    let target = eval.pop(&plan.target).unwrap_or_default();
    let actual = labels(&target)?;

    let predicted = model.predict(&eval)?;
    if predicted.len() != actual.len() {
        return Err(PipelineError::model(format!(
            "model returned {} predictions for {} rows",
            predicted.len(),
            actual.len()
        )));
    }

    let confusion = model.confusion(&predicted, &actual);
    info!(
        "Accuracy {:.3}, precision {:.3}, recall {:.3}",
        confusion.accuracy(),
        confusion.precision(),
        confusion.recall()
    );

    Ok(ModelReport {
        train_rows: train.len(),
        eval_rows: eval.len(),
        confusion,
        importances: model.feat_imp(),
    })
}

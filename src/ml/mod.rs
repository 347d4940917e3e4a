//! ML module - classification statistics from confusion matrices

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Counts (or fractions) of a binary classifier's outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: f64,
    pub tn: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
}

/// Common statistics derived from a confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Actual positive cases.
    pub p: f64,
    /// Actual negative cases.
    pub n: f64,
    /// True positive rate (sensitivity): TP/P.
    pub tpr: f64,
    /// True negative rate (specificity): TN/N.
    pub tnr: f64,
    /// False positive rate (fall-out): FP/N.
    pub fpr: f64,
    /// False negative rate (miss rate): FN/P.
    pub fnr: f64,
    /// Positive predictive value (precision): TP/(TP+FP).
    pub ppv: f64,
    /// Negative predictive value: TN/(TN+FN).
    pub npv: f64,
    /// False discovery rate: FP/(TP+FP).
    pub fdr: f64,
    /// False omission rate: FN/(TN+FN).
    #[serde(rename = "for")]
    pub for_: f64,
    /// Accuracy: (TP+TN)/(P+N).
    pub acc: f64,
    /// F1 score, the harmonic mean of PPV and TPR.
    pub f1: f64,
}

impl ConfusionMatrix {
    pub fn new(tp: f64, tn: f64, fp: f64, fn_: f64) -> Self {
        Self { tp, tn, fp, fn_ }
    }

    pub fn stats(&self) -> ClassificationStats {
        let Self { tp, tn, fp, fn_ } = *self;
        ClassificationStats {
            p: tp + fn_,
            n: fp + tn,
            tpr: tp / (tp + fn_),
            tnr: tn / (tn + fp),
            fpr: fp / (fp + tn),
            fnr: fn_ / (fn_ + tp),
            ppv: tp / (tp + fp),
            npv: tn / (tn + fn_),
            fdr: fp / (tp + fp),
            for_: fn_ / (tn + fn_),
            acc: (tp + tn) / (tp + tn + fp + fn_),
            f1: 2.0 * tp / (2.0 * tp + fp + fn_),
        }
    }
}

/// Add the classification statistics as columns to a frame with `tp`, `tn`, `fp` and `fn`
/// columns.
///
/// The input columns are cast to Float64; zero denominators give NaN or infinity.
pub fn stats_from_conf_mat(df: DataFrame) -> PolarsResult<DataFrame> {
    let f = |name: &str| col(name).cast(DataType::Float64);
    let tp = || col("tp");
    let tn = || col("tn");
    let fp = || col("fp");
    let fn_ = || col("fn");

    df.lazy()
        .with_columns([f("tp"), f("tn"), f("fp"), f("fn")])
        .with_columns([
            (fn_() + tp()).alias("p"),
            (fp() + tn()).alias("n"),
            (tp() / (tp() + fn_())).alias("tpr"),
            (tn() / (tn() + fp())).alias("tnr"),
            (fp() / (fp() + tn())).alias("fpr"),
            (fn_() / (fn_() + tp())).alias("fnr"),
            (tp() / (tp() + fp())).alias("ppv"),
            (tn() / (tn() + fn_())).alias("npv"),
            (fp() / (tp() + fp())).alias("fdr"),
            (fn_() / (tn() + fn_())).alias("for"),
            ((tp() + tn()) / (tp() + tn() + fp() + fn_())).alias("acc"),
            ((lit(2.0) * tp()) / (lit(2.0) * tp() + fp() + fn_())).alias("f1"),
        ])
        .collect()
}

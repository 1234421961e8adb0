//! Stress classification from the heart-rate stream.

mod classifier;

pub use classifier::{
    classify, HysteresisState, StressAssessment, StressClassifier, StressConfig, StressLevel, StressState,
};

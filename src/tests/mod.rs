//! Cross-module test suites for the two compilation pipelines.

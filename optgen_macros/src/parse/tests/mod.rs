//! Unit tests for declaration discovery and attribute parsing.

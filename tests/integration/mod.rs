//! Integration tests for the Helicone redirector
//!
//! Each test points the route table's proxy bases at a wiremock server and
//! drives the real provider clients, so requests are built against the real
//! provider hosts and must be rewritten to reach the mock.

mod errors;

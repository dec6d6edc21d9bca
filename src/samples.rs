//! Bundled sample deal text
//!
//! A static sample input for demos and manual testing, matching the
//! records seeded by
//! [`InMemoryDealStore::with_sample_data`](crate::context::InMemoryDealStore::with_sample_data).
//! Purely a collaborator: it has no coupling to the session beyond
//! supplying raw text to `submit`.

/// Raw sample deal text. The address line resolves against the sample
/// deal store.
pub const SAMPLE_DEAL_TEXT: &str = "\
Subject: Refinance request - 440 N Wabash Ave, Chicago, IL 60611

Borrower is seeking to refinance the existing loan on the office tower
at 440 N Wabash Ave. The building is a 1998-vintage Class B office
property of approximately 120,000 SF in the River North submarket.

Current debt: $18.0M first mortgage, 5.25% fixed, originated June 2019,
10-year term. Borrower reports the building is anchored by a law firm
on a long-term lease with a dental group on the third floor.

Requested terms: $22.0M refinance at prevailing market rates.
Please prepare a preliminary deal memo for credit committee.
";

/// Sample deal text for provisioning into a UI or the CLI.
pub fn sample_deal_text() -> &'static str {
    SAMPLE_DEAL_TEXT
}

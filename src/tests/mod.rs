mod funding_tests;
mod htlc_tests;
mod rlp_tests;

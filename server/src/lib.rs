//! Chore and allowance tracker server.
//!
//! Children fill in a daily record of their assigned chores, submit it, and a
//! parent approves it, which credits the payout to the child's balance.

pub mod backend;

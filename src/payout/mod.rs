pub mod fees;
pub mod withdrawal;

pub use fees::{FeeBreakdown, FeeCheck, Jurisdiction, calculate_net_payout_at, round_cents};
pub use withdrawal::{
    BalanceBreakdown, WithdrawalOutcome, WithdrawalRefusal, available_balance, request_withdrawal,
};

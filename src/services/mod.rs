pub mod payout_poller;

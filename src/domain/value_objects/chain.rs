/// On-chain transaction facts needed by the confirmation guard: the
/// transaction must exist, have succeeded, and pay the configured treasury
/// address.
#[derive(Debug, Clone)]
pub struct ChainTransaction {
    pub hash: String,
    pub to_address: String,
    pub succeeded: bool,
}

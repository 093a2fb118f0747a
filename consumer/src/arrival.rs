/// Classification of a frame's first-segment inter-arrival delay against the sampling
/// period, used only for diagnostics — it does not feed back into DRD or λ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrivalKind {
    /// Inter-arrival delay is close to the sampling period: the consumer is keeping
    /// pace with live production.
    CatchingUp,
    /// Inter-arrival delay is well below the sampling period: the response was
    /// probably served from a cache rather than freshly generated.
    LikelyCached,
}

impl ArrivalKind {
    pub fn classify(inter_arrival: std::time::Duration, sample_period: std::time::Duration) -> Self {
        if inter_arrival.as_secs_f64() >= 0.8 * sample_period.as_secs_f64() {
            ArrivalKind::CatchingUp
        } else {
            ArrivalKind::LikelyCached
        }
    }
}

use crate::domain::Verdict;

/// Fold domain verdicts: any FAIL wins, then any INSUFFICIENT_DATA, otherwise PASS.
pub fn aggregate<I>(verdicts: I) -> Verdict
where
    I: IntoIterator<Item = Verdict>,
{
    verdicts
        .into_iter()
        .fold(Verdict::Pass, |acc, verdict| match (acc, verdict) {
            (Verdict::Fail, _) | (_, Verdict::Fail) => Verdict::Fail,
            (Verdict::InsufficientData, _) | (_, Verdict::InsufficientData) => {
                Verdict::InsufficientData
            }
            (Verdict::Pass, Verdict::Pass) => Verdict::Pass,
        })
}

use futures::stream::{self, Stream, StreamExt};

use super::{VerificationPipeline, VerificationVerdict};
use crate::probe::Prober;
use crate::resolver::ResolveExchangers;

impl<R, P> VerificationPipeline<R, P>
where
    R: ResolveExchangers,
    P: Prober,
{
    /// Verifies `addresses` with at most `max_concurrency` verifications in
    /// flight. Addresses are pulled lazily; verdicts are yielded as they
    /// complete, tagged with the index of their address in the input.
    pub fn verify_batch<'a, I>(
        &'a self,
        addresses: I,
    ) -> impl Stream<Item = (usize, VerificationVerdict)> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        let limit = self.config.concurrency_limit();
        stream::iter(addresses.into_iter().enumerate())
            .map(move |(index, address)| async move { (index, self.verify(&address).await) })
            .buffer_unordered(limit)
    }

    /// Runs [`verify_batch`](Self::verify_batch) to completion and returns
    /// the verdicts in input order.
    pub async fn verify_all<I>(&self, addresses: I) -> Vec<VerificationVerdict>
    where
        I: IntoIterator<Item = String>,
    {
        let addresses: Vec<String> = addresses.into_iter().collect();
        let mut verdicts: Vec<_> = self.verify_batch(addresses).collect().await;
        verdicts.sort_by_key(|(index, _)| *index);
        verdicts.into_iter().map(|(_, verdict)| verdict).collect()
    }
}

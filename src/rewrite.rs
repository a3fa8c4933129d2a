//! Finding a nonce for a commit and writing it back
//!
//! The flow is: read the commit, search for a nonce, amend the message with
//! the nonce as a new last line, then check that git computed the commit id
//! the search predicted.

use serde::Serialize;
use vanity_core::{
    CommitPayload, DesiredPrefix, NotFoundReason, ParallelSearch, SearchError, SearchParams,
    SearchReport, SearchResult, Solution, full_partition_count, plan, search,
};

use crate::config::MinerConfig;
use crate::error::VanityError;
use crate::git::{CommitMetadata, CommitStore};

/// Everything read from the repository before searching.
#[derive(Debug, Clone)]
pub struct PreparedCommit {
    pub commit: String,
    pub payload: CommitPayload,
    pub message: String,
    pub metadata: CommitMetadata,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub commit: String,
    pub prefix: String,
    pub nonce: String,
    pub digest: String,
    pub candidates: u64,
    pub elapsed_secs: f64,
    pub hashrate: f64,
    /// Whether the commit was amended
    pub applied: bool,
}

/// Header names whose presence means the commit is signed
const SIGNATURE_HEADERS: [&str; 2] = ["gpgsig", "gpgsig-sha256"];

/// Read the commit and check it can be rewritten to the bytes the search sees.
///
/// Fails before any search when the message is empty, the commit is signed,
/// or the raw content does not end with the message.
pub fn prepare<S: CommitStore>(store: &S, commit: &str) -> Result<PreparedCommit, VanityError> {
    let raw = store.raw_content(commit)?;
    let message = store.message(commit)?;

    if let Some(header) = signature_header(&raw) {
        return Err(VanityError::SignedCommit(header.to_string()));
    }
    if message.trim_end_matches('\n').is_empty() {
        return Err(VanityError::EmptyMessage);
    }

    let payload = CommitPayload::new(&raw);
    if !payload.ends_with_message(&message) {
        return Err(VanityError::MessageMismatch);
    }

    Ok(PreparedCommit {
        commit: commit.to_string(),
        payload,
        message: message.trim_end_matches('\n').to_string(),
        metadata: store.metadata(commit)?,
    })
}

/// First signature header among the commit's headers, if any.
fn signature_header(raw: &[u8]) -> Option<&'static str> {
    raw.split(|&b| b == b'\n')
        .take_while(|line| !line.is_empty())
        .find_map(|line| {
            let name = line.split(|&b| b == b' ').next()?;
            SIGNATURE_HEADERS
                .into_iter()
                .find(|header| header.as_bytes() == name)
        })
}

/// Message that makes the commit body end in `nonce` on its own line.
pub fn message_with_nonce(message: &str, nonce: &str) -> String {
    format!("{}\n{}\n", message.trim_end_matches('\n'), nonce)
}

/// Search for a nonce using the configured number of workers.
///
/// One worker without a timeout runs the single-threaded search, which always
/// returns the smallest matching nonce. Anything else races partitions.
pub fn find(
    payload: &CommitPayload,
    params: &SearchParams,
    config: &MinerConfig,
    workers: usize,
) -> Result<SearchReport, VanityError> {
    if workers == 1 && config.timeout().is_none() {
        return Ok(search(payload, params)?);
    }

    let char_len = config.partition_chars.min(params.nonce_len());
    let count = full_partition_count(char_len, params.alphabet()).ok_or_else(|| {
        SearchError::InvalidPartition(format!(
            "{} partition characters is too many",
            char_len
        ))
    })?;
    let partitions = plan(count, char_len, params.alphabet())?;

    let mut coordinator = ParallelSearch::new(workers);
    if let Some(timeout) = config.timeout() {
        coordinator = coordinator.with_timeout(timeout);
    }

    Ok(coordinator.run(payload, params, &partitions)?)
}

/// Turn a finished search into its solution, or the error explaining why none exists.
pub fn expect_solution(report: &SearchReport, params: &SearchParams) -> Result<Solution, VanityError> {
    match &report.result {
        SearchResult::Found(solution) => Ok(solution.clone()),
        SearchResult::NotFound(NotFoundReason::Exhausted) => Err(VanityError::SearchExhausted {
            prefix: params.prefix().to_string(),
            nonce_len: params.nonce_len(),
            alphabet: params.alphabet().to_string(),
        }),
        SearchResult::NotFound(reason) => Err(VanityError::Interrupted(*reason)),
    }
}

/// Amend the commit with `solution` and verify the resulting commit id.
pub fn apply<S: CommitStore>(
    store: &S,
    prepared: &PreparedCommit,
    solution: &Solution,
) -> Result<(), VanityError> {
    let message = message_with_nonce(&prepared.message, &solution.nonce);
    store.amend(&prepared.commit, &message, &prepared.metadata)?;

    let actual = store.resolve(&prepared.commit)?;
    if actual != solution.digest_hex {
        tracing::error!(
            expected = %solution.digest_hex,
            %actual,
            "rewritten commit does not match search result"
        );
        return Err(VanityError::IntegrityMismatch {
            expected: solution.digest_hex.clone(),
            actual,
        });
    }

    tracing::info!(commit = %actual, "commit rewritten");
    Ok(())
}

/// Prepare, search and (unless `config.dry_run`) apply in one go.
pub fn run<S: CommitStore>(
    store: &S,
    commit: &str,
    prefix: DesiredPrefix,
    config: &MinerConfig,
    workers: usize,
) -> Result<Outcome, VanityError> {
    let params = SearchParams::new(prefix, config.alphabet()?, config.nonce_length)?;
    let prepared = prepare(store, commit)?;

    tracing::info!(
        commit,
        prefix = %params.prefix(),
        nonce_len = params.nonce_len(),
        alphabet = %params.alphabet(),
        workers,
        "searching for nonce"
    );

    let report = find(&prepared.payload, &params, config, workers)?;
    let solution = expect_solution(&report, &params)?;

    tracing::info!(
        nonce = %solution.nonce,
        digest = %solution.digest_hex,
        candidates = report.candidates,
        "found nonce"
    );

    if !config.dry_run {
        apply(store, &prepared, &solution)?;
    }

    Ok(Outcome {
        commit: commit.to_string(),
        prefix: params.prefix().to_string(),
        nonce: solution.nonce,
        digest: solution.digest_hex,
        candidates: report.candidates,
        elapsed_secs: report.elapsed.as_secs_f64(),
        hashrate: report.hashrate(),
        applied: !config.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use sha1::{Digest, Sha1};

    use super::*;

    const BODY: &str = "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author Ada Lovelace <ada@example.com> 1700000000 +0000\n\
committer Ada Lovelace <ada@example.com> 1700000000 +0000\n\
\n";

    /// In-memory commit that hashes like git.
    struct MemoryStore {
        /// Headers plus the blank separator line
        body: &'static str,
        message: RefCell<String>,
        /// Extra bytes git would add on amend, simulating a hook or signature
        tamper: Option<&'static str>,
        amends: RefCell<usize>,
    }

    impl MemoryStore {
        fn new(message: &str) -> Self {
            Self {
                body: BODY,
                message: RefCell::new(message.to_string()),
                tamper: None,
                amends: RefCell::new(0),
            }
        }

        fn raw(&self) -> String {
            format!("{}{}", self.body, self.message.borrow())
        }
    }

    impl CommitStore for MemoryStore {
        fn raw_content(&self, _commit: &str) -> Result<Vec<u8>, VanityError> {
            Ok(self.raw().into_bytes())
        }

        fn message(&self, _commit: &str) -> Result<String, VanityError> {
            Ok(self.message.borrow().clone())
        }

        fn metadata(&self, _commit: &str) -> Result<CommitMetadata, VanityError> {
            Ok(CommitMetadata {
                author_name: "Ada Lovelace".to_string(),
                author_email: "ada@example.com".to_string(),
                author_date: "1700000000 +0000".to_string(),
                committer_name: "Ada Lovelace".to_string(),
                committer_email: "ada@example.com".to_string(),
                committer_date: "1700000000 +0000".to_string(),
            })
        }

        fn amend(
            &self,
            _commit: &str,
            message: &str,
            _metadata: &CommitMetadata,
        ) -> Result<(), VanityError> {
            let mut stored = message.to_string();
            if let Some(extra) = self.tamper {
                stored.push_str(extra);
            }
            *self.message.borrow_mut() = stored;
            *self.amends.borrow_mut() += 1;
            Ok(())
        }

        fn resolve(&self, _commit: &str) -> Result<String, VanityError> {
            let raw = self.raw();
            let mut hasher = Sha1::new();
            hasher.update(format!("commit {}\0", raw.len()));
            hasher.update(raw);
            Ok(hex::encode(hasher.finalize()))
        }
    }

    fn single_worker() -> MinerConfig {
        MinerConfig {
            workers: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_message_with_nonce() {
        assert_eq!(message_with_nonce("Fix bug", "a1b"), "Fix bug\na1b\n");
        assert_eq!(message_with_nonce("Fix bug\n\n", "a1b"), "Fix bug\na1b\n");
    }

    #[test]
    fn test_run_rewrites_and_verifies() {
        let store = MemoryStore::new("Initial commit\n");
        let prefix: DesiredPrefix = "00".parse().unwrap();

        let outcome = run(&store, "HEAD", prefix, &single_worker(), 1).unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.nonce, "00d7");
        assert_eq!(outcome.digest, "005f0991dfce56c5d25a59554b1080b4c8afecda");
        assert_eq!(store.resolve("HEAD").unwrap(), outcome.digest);
        assert_eq!(*store.message.borrow(), "Initial commit\n00d7\n");
    }

    #[test]
    fn test_dry_run_leaves_commit_alone() {
        let store = MemoryStore::new("Initial commit\n");
        let before = store.resolve("HEAD").unwrap();
        let config = MinerConfig {
            dry_run: true,
            ..single_worker()
        };

        let outcome = run(&store, "HEAD", "0".parse().unwrap(), &config, 1).unwrap();

        assert!(!outcome.applied);
        assert!(outcome.digest.starts_with('0'));
        assert_eq!(store.resolve("HEAD").unwrap(), before);
        assert_eq!(*store.amends.borrow(), 0);
    }

    #[test]
    fn test_integrity_mismatch_is_fatal() {
        let mut store = MemoryStore::new("Initial commit\n");
        store.tamper = Some("Signed-off-by: hook\n");

        let err = run(&store, "HEAD", "0".parse().unwrap(), &single_worker(), 1).unwrap_err();
        match err {
            VanityError::IntegrityMismatch { expected, actual } => {
                assert!(expected.starts_with('0'));
                assert_ne!(expected, actual);
            }
            other => panic!("expected integrity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_exhaustion_reported_distinctly() {
        let store = MemoryStore::new("Initial commit\n");
        let config = MinerConfig {
            alphabet: "01".to_string(),
            nonce_length: Some(1),
            ..single_worker()
        };

        let err = run(&store, "HEAD", "abcdef01".parse().unwrap(), &config, 1).unwrap_err();
        assert!(matches!(
            err,
            VanityError::SearchExhausted { nonce_len: 1, .. }
        ));
        assert_eq!(*store.amends.borrow(), 0);
    }

    #[test]
    fn test_parallel_run_verifies() {
        let store = MemoryStore::new("Initial commit\n");
        let config = MinerConfig {
            workers: Some(4),
            ..Default::default()
        };

        let outcome = run(&store, "HEAD", "ab".parse().unwrap(), &config, 4).unwrap();
        assert!(outcome.digest.starts_with("ab"));
        assert_eq!(store.resolve("HEAD").unwrap(), outcome.digest);
    }

    #[test]
    fn test_message_mismatch_rejected() {
        struct Mismatched(MemoryStore);

        impl CommitStore for Mismatched {
            fn raw_content(&self, commit: &str) -> Result<Vec<u8>, VanityError> {
                self.0.raw_content(commit)
            }
            fn message(&self, _commit: &str) -> Result<String, VanityError> {
                Ok("Something else".to_string())
            }
            fn metadata(&self, commit: &str) -> Result<CommitMetadata, VanityError> {
                self.0.metadata(commit)
            }
            fn amend(
                &self,
                commit: &str,
                message: &str,
                metadata: &CommitMetadata,
            ) -> Result<(), VanityError> {
                self.0.amend(commit, message, metadata)
            }
            fn resolve(&self, commit: &str) -> Result<String, VanityError> {
                self.0.resolve(commit)
            }
        }

        let store = Mismatched(MemoryStore::new("Initial commit\n"));
        let err = prepare(&store, "HEAD").unwrap_err();
        assert!(matches!(err, VanityError::MessageMismatch));
    }

    #[test]
    fn test_invalid_alphabet_rejected() {
        let store = MemoryStore::new("Initial commit\n");
        let config = MinerConfig {
            alphabet: "aa".to_string(),
            ..single_worker()
        };

        let err = run(&store, "HEAD", "0".parse().unwrap(), &config, 1).unwrap_err();
        assert!(matches!(err, VanityError::Search(_)));
    }

    #[test]
    fn test_oversized_nonce_length_rejected() {
        let store = MemoryStore::new("Initial commit\n");
        let config = MinerConfig {
            nonce_length: Some(usize::MAX),
            ..single_worker()
        };

        let err = run(&store, "HEAD", "0".parse().unwrap(), &config, 1).unwrap_err();
        assert!(matches!(
            err,
            VanityError::Search(SearchError::InvalidNonceLength(usize::MAX))
        ));
    }

    #[test]
    fn test_empty_message_rejected_before_search() {
        let store = MemoryStore::new("");
        let err = run(&store, "HEAD", "0".parse().unwrap(), &single_worker(), 1).unwrap_err();

        assert!(matches!(err, VanityError::EmptyMessage));
        assert_eq!(*store.amends.borrow(), 0);
    }

    #[test]
    fn test_signed_commit_rejected_before_search() {
        let mut store = MemoryStore::new("Initial commit\n");
        store.body = "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author Ada Lovelace <ada@example.com> 1700000000 +0000\n\
committer Ada Lovelace <ada@example.com> 1700000000 +0000\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQEzBAABCAAdFiEE\n -----END PGP SIGNATURE-----\n\
\n";

        let err = run(&store, "HEAD", "0".parse().unwrap(), &single_worker(), 1).unwrap_err();
        match err {
            VanityError::SignedCommit(header) => assert_eq!(header, "gpgsig"),
            other => panic!("expected signed commit error, got {other:?}"),
        }
        assert_eq!(*store.amends.borrow(), 0);
    }

    #[test]
    fn test_signature_header_only_read_from_headers() {
        assert_eq!(signature_header(b"tree abc\ngpgsig-sha256 x\n\nmsg\n"), Some("gpgsig-sha256"));
        assert_eq!(signature_header(b"tree abc\n\ngpgsig in the message\n"), None);
        assert_eq!(signature_header(b"tree abc\ngpgsigner x\n\nmsg\n"), None);
    }
}

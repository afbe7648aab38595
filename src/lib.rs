//! Umbrella crate tying tokenizer, fingerprint, index, matcher, and rebuild
//! together. The HTTP surface lives in `codecheck-server`, a separate
//! workspace member; this crate is the library half shared by that server
//! and by the `codecheck-rebuild` CLI.

pub mod fs_source;

pub use fingerprint::{
    hamming_distance, shard_of_fp, winnow_tokens, Chunk, ChunkConfig, Fingerprint,
    FingerprintError, SimHashConfig, SimHashEngine, WinnowConfig,
};
pub use index::{BackendConfig, DocStat, Index, IndexBackend, IndexError, Posting, SimHashRecord};
pub use matcher::{
    check_simhash, check_winnow, covered_lines, merge_intervals, DocumentMetadataProvider,
    EvidencePair, Interval, MatchConfig, MatchError, SimHashMatch, SimHashReport, WinnowMatch,
    WinnowReport,
};
pub use rebuild::{
    DocumentRecord, DocumentSource, IndexBuilder, RebuildConfig, RebuildError, RebuildStats,
};
pub use tokenizer::{tokenize, Token, TokenStream};

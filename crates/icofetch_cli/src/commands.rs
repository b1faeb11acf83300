//! Subcommand implementations.
//!
//! Each function builds the core collaborators from configuration, runs one
//! operation and folds the result into an [`Envelope`] ready for printing.

use crate::{RenderArgs, ResolveArgs, SyncArgs};
use icofetch_core::{
    parse_manifest, render_error_code, render_manifest, resolve_error_code, sync_catalog,
    sync_error_code, BatchOutcome, BatchReport, CoreConfig, Envelope, ErrorCode, HttpCatalogClient,
    MatchMode, RenderBatchOptions, RenderDefaults, ResolutionEngine, ResolutionOutcome,
    ResolveOptions, SnapshotStore, SvgPassthrough, SyncOptions,
};
use log::error;
use serde_json::{json, Value};

type CliEnvelope = Envelope<Value>;

fn transport_failure(message: String) -> CliEnvelope {
    error!("event=command module=cli status=error code=transport error={message}");
    Envelope::failure(ErrorCode::Transport, message)
}

fn catalog_client(config: &CoreConfig) -> Result<HttpCatalogClient, CliEnvelope> {
    HttpCatalogClient::new(config).map_err(|err| transport_failure(err.to_string()))
}

/// `icofetch resolve`
pub fn resolve(config: &CoreConfig, args: &ResolveArgs) -> CliEnvelope {
    let client = match catalog_client(config) {
        Ok(client) => client,
        Err(envelope) => return envelope,
    };
    let store = SnapshotStore::new(&config.cache_dir);
    let engine = ResolutionEngine::new(&store, &client);

    let mut opts = ResolveOptions {
        match_mode: if args.exact {
            MatchMode::Exact
        } else {
            MatchMode::Fuzzy
        },
        source_mode: args.source.into_core(),
        offline: args.offline,
        preferred_prefixes: args.preferred.clone(),
        auto_pick: args.pick,
        ..ResolveOptions::default()
    };
    if let Some(min_score) = args.min_score {
        opts.min_score = min_score;
    }
    if let Some(limit) = args.limit {
        opts.search_limit = limit;
    }
    if !args.collections.is_empty() {
        opts.allowed_prefixes = Some(args.collections.iter().cloned().collect());
    }

    match engine.resolve(&args.query, &opts) {
        Ok(outcome @ (ResolutionOutcome::Exact { .. } | ResolutionOutcome::Fuzzy { .. })) => {
            match serde_json::to_value(&outcome) {
                Ok(data) => Envelope::success(data),
                Err(err) => Envelope::failure(ErrorCode::Internal, err.to_string()),
            }
        }
        Ok(ResolutionOutcome::NotFound) => Envelope::failure(
            ErrorCode::NotFound,
            format!("no icon matches `{}`", args.query),
        ),
        Ok(ResolutionOutcome::Ambiguous { candidates }) => Envelope::failure_with_details(
            ErrorCode::Ambiguous,
            format!(
                "`{}` is ambiguous between {} candidates; pass --pick or refine the query",
                args.query,
                candidates.len()
            ),
            serde_json::to_value(&candidates).unwrap_or(Value::Null),
        ),
        Err(err) => Envelope::failure(resolve_error_code(&err), err.to_string()),
    }
}

/// `icofetch sync`
pub fn sync(config: &CoreConfig, args: &SyncArgs) -> CliEnvelope {
    let client = match catalog_client(config) {
        Ok(client) => client,
        Err(envelope) => return envelope,
    };
    let store = SnapshotStore::new(&config.cache_dir);
    let opts = SyncOptions {
        concurrency: args.concurrency,
        include_hidden: args.include_hidden,
        fail_fast: args.fail_fast,
    };

    match sync_catalog(&client, &store, &opts) {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(data) => Envelope::success(data),
            Err(err) => Envelope::failure(ErrorCode::Internal, err.to_string()),
        },
        Err(err) => Envelope::failure(sync_error_code(&err), err.to_string()),
    }
}

/// `icofetch render`
pub fn render(config: &CoreConfig, args: &RenderArgs) -> CliEnvelope {
    let text = match std::fs::read_to_string(&args.manifest) {
        Ok(text) => text,
        Err(err) => {
            return Envelope::failure(
                ErrorCode::Filesystem,
                format!("cannot read manifest `{}`: {err}", args.manifest.display()),
            )
        }
    };
    let items = match parse_manifest(&text) {
        Ok(items) => items,
        Err(err) => return Envelope::failure(ErrorCode::Usage, err.to_string()),
    };

    let client = match catalog_client(config) {
        Ok(client) => client,
        Err(envelope) => return envelope,
    };
    let store = SnapshotStore::new(&config.cache_dir);
    let renderer = SvgPassthrough;

    let mut defaults = RenderDefaults::default();
    if let Some(size) = args.size {
        defaults.size = size;
    }
    if let Some(color) = &args.color {
        defaults.color = Some(color.clone());
    }
    if let Some(format) = args.format {
        defaults.format = format.into_core();
    }

    let opts = RenderBatchOptions {
        concurrency: args.concurrency,
        fail_fast: args.fail_fast,
        defaults,
        resolve: ResolveOptions {
            source_mode: args.source.into_core(),
            offline: args.offline,
            // Batches must not stall on disambiguation prompts.
            auto_pick: true,
            ..ResolveOptions::default()
        },
    };

    let results = render_manifest(&client, &store, &renderer, items, &opts);
    let report = BatchReport::from_items(&results);

    let mut first_failure: Option<(ErrorCode, String)> = None;
    let item_reports: Vec<Value> = results
        .iter()
        .map(|item| match &item.outcome {
            BatchOutcome::Ok(rendered) => json!({
                "index": item.index,
                "query": item.input.query,
                "status": "ok",
                "id": rendered.id.full(),
                "output": rendered.output,
                "bytes_written": rendered.bytes_written,
            }),
            BatchOutcome::Failed(err) => {
                let code = render_error_code(err);
                if first_failure.is_none() {
                    first_failure = Some((code, err.to_string()));
                }
                json!({
                    "index": item.index,
                    "query": item.input.query,
                    "status": "failed",
                    "error": { "code": code.as_str(), "message": err.to_string() },
                })
            }
            BatchOutcome::Skipped => json!({
                "index": item.index,
                "query": item.input.query,
                "status": "skipped",
            }),
        })
        .collect();

    let payload = json!({ "report": report, "items": item_reports });
    match first_failure {
        None => Envelope::success(payload),
        Some((code, message)) => Envelope::failure_with_details(code, message, payload),
    }
}

/// `icofetch cache status`
pub fn cache_status(config: &CoreConfig) -> CliEnvelope {
    let store = SnapshotStore::new(&config.cache_dir);
    match store.read() {
        Ok(Some(snapshot)) => Envelope::success(json!({
            "present": true,
            "total": snapshot.total,
            "updated_at_ms": snapshot.updated_at_ms,
            "path": store.path(),
        })),
        Ok(None) => Envelope::success(json!({
            "present": false,
            "path": store.path(),
        })),
        Err(err) => Envelope::failure(ErrorCode::Filesystem, err.to_string()),
    }
}

/// `icofetch cache clear`
pub fn cache_clear(config: &CoreConfig) -> CliEnvelope {
    let store = SnapshotStore::new(&config.cache_dir);
    match store.clear() {
        Ok(removed) => Envelope::success(json!({ "removed": removed })),
        Err(err) => Envelope::failure(ErrorCode::Filesystem, err.to_string()),
    }
}

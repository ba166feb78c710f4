use std::ops::ControlFlow;

use async_lsp::lsp_types::{
    ColorInformation, ColorPresentation, ColorPresentationParams, ColorProviderCapability,
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentColorParams, FileChangeType, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, Location, NumberOrString, OneOf, ProgressParams,
    ProgressParamsValue, PublishDiagnosticsParams, ReferenceParams, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgress,
    WorkDoneProgressBegin, WorkDoneProgressCreateParams, WorkDoneProgressEnd,
    WorkDoneProgressReport, notification, request,
};
use async_lsp::router::Router;
use async_lsp::{ClientSocket, LanguageClient, LanguageServer, ResponseError};
use futures::future::{BoxFuture, ready};
use ide::analysis::{Analysis, AnalysisHost};
use ide::file_system::FilePath;
use ide::index::{DocumentKind, ScanProgress};

use crate::config::Config;
use crate::handlers;
use crate::to_proto;
use crate::vfs::{OpenFile, UrlExt, Vfs};

pub struct Server {
    host: AnalysisHost,
    vfs: Vfs,
    config: Config,
    client: ClientSocket,
    roots: Vec<FilePath>,
    initialized: bool,
    progress_supported: bool,
    scan_generation: u32,
}

/// Runs a workspace scan on the main loop.
struct ScanRequest {
    token: Option<NumberOrString>,
    /// Drop the index before scanning, for a changed file filter.
    reset: bool,
}

impl Server {
    pub fn new_router(client: ClientSocket) -> Router<Self> {
        let this = Self::new(client);
        let mut router = Router::new(this);
        router
            .request::<request::Initialize, _>(Self::initialize)
            .notification::<notification::Initialized>(Self::initialized)
            .request::<request::Shutdown, _>(|_, _| ready(Ok(())))
            .notification::<notification::Exit>(|_, _| ControlFlow::Break(Ok(())))
            .notification::<notification::DidOpenTextDocument>(Self::did_open)
            .notification::<notification::DidChangeTextDocument>(Self::did_change)
            .notification::<notification::DidSaveTextDocument>(|_, _| ControlFlow::Continue(()))
            .notification::<notification::DidCloseTextDocument>(Self::did_close)
            .notification::<notification::DidChangeConfiguration>(Self::did_change_configuration)
            .notification::<notification::DidChangeWatchedFiles>(Self::did_change_watched_files)
            .request::<request::HoverRequest, _>(Self::hover)
            .request::<request::Completion, _>(Self::completion)
            .request::<request::GotoDefinition, _>(Self::definition)
            .request::<request::References, _>(Self::references)
            .request::<request::DocumentColor, _>(Self::document_color)
            .request::<request::ColorPresentationRequest, _>(Self::color_presentation)
            .event::<ScanRequest>(Self::scan)
            .unhandled_notification(|_, notif| {
                tracing::debug!(method = %notif.method, "ignored notification");
                ControlFlow::Continue(())
            });
        router
    }

    fn new(client: ClientSocket) -> Self {
        Self {
            host: AnalysisHost::new(),
            vfs: Vfs::new(),
            config: Config::default(),
            client,
            roots: Vec::new(),
            initialized: false,
            progress_supported: false,
            scan_generation: 0,
        }
    }
}

impl LanguageServer for Server {
    type Error = ResponseError;
    type NotifyResult = ControlFlow<async_lsp::Result<()>>;

    fn initialize(
        &mut self,
        params: InitializeParams,
    ) -> BoxFuture<'static, Result<InitializeResult, Self::Error>> {
        tracing::info!("initialize: {params:?}");
        self.roots = workspace_roots(&params);
        self.progress_supported = params
            .capabilities
            .window
            .as_ref()
            .and_then(|it| it.work_done_progress)
            .unwrap_or(false);
        if let Some(options) = params.initialization_options
            && let Err(err) = self.config.update(options)
        {
            tracing::warn!("invalid initialization options: {err}");
        }

        Box::pin(ready(Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["-".to_string()]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                color_provider: Some(ColorProviderCapability::Simple(true)),
                ..Default::default()
            },
        })))
    }

    fn initialized(&mut self, _: InitializedParams) -> Self::NotifyResult {
        self.initialized = true;
        self.request_scan(false);
        ControlFlow::Continue(())
    }

    fn did_open(&mut self, params: DidOpenTextDocumentParams) -> Self::NotifyResult {
        let doc = params.text_document;
        let Some(path) = doc.uri.to_file_path_opt() else {
            return ControlFlow::Continue(());
        };
        let kind = match DocumentKind::from_path(&path) {
            DocumentKind::Other => DocumentKind::from_language_id(&doc.language_id),
            kind => kind,
        };
        self.host.set_file_content(path.clone(), &doc.text, kind);
        self.vfs.open(
            path,
            OpenFile {
                text: doc.text,
                version: doc.version,
                kind,
            },
        );
        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn did_change(&mut self, mut params: DidChangeTextDocumentParams) -> Self::NotifyResult {
        let Some(change) = params.content_changes.pop() else {
            return ControlFlow::Continue(());
        };
        let Some(path) = params.text_document.uri.to_file_path_opt() else {
            return ControlFlow::Continue(());
        };
        let Some(file) = self
            .vfs
            .change(&path, change.text, params.text_document.version)
        else {
            tracing::warn!(%path, "change to a document that is not open");
            return ControlFlow::Continue(());
        };
        self.host.set_file_content(path, &file.text, file.kind);
        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn did_close(&mut self, params: DidCloseTextDocumentParams) -> Self::NotifyResult {
        let uri = params.text_document.uri;
        let Some(path) = uri.to_file_path_opt() else {
            return ControlFlow::Continue(());
        };
        self.vfs.close(&path);
        self.host.refresh_from_disk(&self.vfs, &path);

        let params = PublishDiagnosticsParams::new(uri, Vec::new(), None);
        if let Err(err) = self.client.publish_diagnostics(params) {
            tracing::warn!("failed to clear diagnostics: {err}");
        }
        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn did_change_configuration(
        &mut self,
        params: DidChangeConfigurationParams,
    ) -> Self::NotifyResult {
        let scan = self.config.scan.clone();
        if let Err(err) = self.config.update(params.settings) {
            tracing::warn!("invalid configuration: {err}");
            return ControlFlow::Continue(());
        }
        tracing::info!("configuration updated: {:?}", self.config);

        if self.initialized && self.config.scan != scan {
            self.request_scan(true);
        }
        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn did_change_watched_files(
        &mut self,
        params: DidChangeWatchedFilesParams,
    ) -> Self::NotifyResult {
        for change in params.changes {
            let Some(path) = change.uri.to_file_path_opt() else {
                continue;
            };
            if self.vfs.is_open(&path) {
                continue;
            }
            if change.typ == FileChangeType::DELETED {
                self.host.remove_file(&path);
            } else if self.host.index().contains(&path) || self.is_watched(&path) {
                self.host.refresh_from_disk(&self.vfs, &path);
            }
        }
        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn hover(&mut self, params: HoverParams) -> BoxFuture<'static, Result<Option<Hover>, Self::Error>> {
        let result = handlers::hover(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }

    fn completion(
        &mut self,
        params: CompletionParams,
    ) -> BoxFuture<'static, Result<Option<CompletionResponse>, Self::Error>> {
        let result = handlers::completion(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }

    fn definition(
        &mut self,
        params: GotoDefinitionParams,
    ) -> BoxFuture<'static, Result<Option<GotoDefinitionResponse>, Self::Error>> {
        let result = handlers::definition(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }

    fn references(
        &mut self,
        params: ReferenceParams,
    ) -> BoxFuture<'static, Result<Option<Vec<Location>>, Self::Error>> {
        let result = handlers::references(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }

    fn document_color(
        &mut self,
        params: DocumentColorParams,
    ) -> BoxFuture<'static, Result<Vec<ColorInformation>, Self::Error>> {
        let result = handlers::document_color(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }

    fn color_presentation(
        &mut self,
        params: ColorPresentationParams,
    ) -> BoxFuture<'static, Result<Vec<ColorPresentation>, Self::Error>> {
        let result = handlers::color_presentation(self.snapshot(), params);
        Box::pin(ready(Ok(result)))
    }
}

impl Server {
    fn snapshot(&self) -> ServerSnapshot<'_> {
        ServerSnapshot {
            analysis: self.host.analysis(),
            config: &self.config,
        }
    }

    fn is_watched(&self, path: &FilePath) -> bool {
        let Ok(filter) = self.config.scan.filter() else {
            return false;
        };
        self.roots.iter().any(|root| {
            path.as_path().starts_with(root.as_path()) && filter.is_match(path.relative_to(root))
        })
    }

    /// Creates a progress token when the client supports it, then hands the
    /// scan back to the main loop.
    fn request_scan(&mut self, reset: bool) {
        if !self.progress_supported {
            if let Err(err) = self.client.emit(ScanRequest { token: None, reset }) {
                tracing::error!("failed to start workspace scan: {err}");
            }
            return;
        }

        self.scan_generation += 1;
        let token = NumberOrString::String(format!("css-variables/scan/{}", self.scan_generation));
        let mut client = self.client.clone();
        tokio::spawn(async move {
            let params = WorkDoneProgressCreateParams {
                token: token.clone(),
            };
            let token = match client.work_done_progress_create(params).await {
                Ok(()) => Some(token),
                Err(err) => {
                    tracing::warn!("failed to create scan progress: {err}");
                    None
                }
            };
            if let Err(err) = client.emit(ScanRequest { token, reset }) {
                tracing::error!("failed to start workspace scan: {err}");
            }
        });
    }

    fn scan(&mut self, request: ScanRequest) -> ControlFlow<async_lsp::Result<()>> {
        if request.reset {
            self.host = AnalysisHost::new();
        }

        let mut progress = ScanReporter::new(self.client.clone(), request.token);
        progress.begin();
        match self.host.scan(&self.vfs, &self.roots, &self.config.scan) {
            Ok(scan) => {
                for step in scan {
                    progress.report(step);
                }
            }
            Err(err) => tracing::error!("cannot scan workspace: {err}"),
        }

        // Open documents outside the scanned roots.
        for (path, file) in self.vfs.open_files() {
            if !self.host.index().contains(path) {
                self.host.set_file_content(path.clone(), &file.text, file.kind);
            }
        }
        progress.end(self.host.index().documents().count());

        self.publish_diagnostics();
        ControlFlow::Continue(())
    }

    fn publish_diagnostics(&mut self) {
        let analysis = self.host.analysis();
        for (path, file) in self.vfs.open_files() {
            let Some(uri) = Url::from_file_path_opt(path) else {
                continue;
            };
            let diagnostics = match analysis.line_index(path) {
                Some(line_index) => analysis
                    .diagnostics(path, self.config.undefined_var)
                    .into_iter()
                    .filter_map(|it| to_proto::diagnostic(line_index, it))
                    .collect(),
                None => Vec::new(),
            };
            let params = PublishDiagnosticsParams::new(uri, diagnostics, Some(file.version));
            if let Err(err) = self.client.publish_diagnostics(params) {
                tracing::warn!(%path, "failed to publish diagnostics: {err}");
            }
        }
    }
}

#[allow(deprecated)]
fn workspace_roots(params: &InitializeParams) -> Vec<FilePath> {
    if let Some(folders) = &params.workspace_folders {
        return folders
            .iter()
            .filter_map(|folder| folder.uri.to_file_path_opt())
            .collect();
    }
    params
        .root_uri
        .iter()
        .filter_map(|uri| uri.to_file_path_opt())
        .collect()
}

/// `$/progress` notifications for one scan; silent without a token.
struct ScanReporter {
    client: ClientSocket,
    token: Option<NumberOrString>,
}

impl ScanReporter {
    fn new(client: ClientSocket, token: Option<NumberOrString>) -> Self {
        Self { client, token }
    }

    fn begin(&mut self) {
        self.send(WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: "Indexing CSS variables".to_string(),
            cancellable: Some(false),
            message: None,
            percentage: Some(0),
        }));
    }

    fn report(&mut self, progress: ScanProgress) {
        tracing::debug!(done = progress.done, total = progress.total, "scan progress");
        let percentage = (progress.done * 100)
            .checked_div(progress.total)
            .unwrap_or(100);
        self.send(WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(false),
            message: Some(format!("{}/{}", progress.done, progress.total)),
            percentage: Some(u32::try_from(percentage).unwrap_or(100)),
        }));
    }

    fn end(&mut self, documents: usize) {
        self.send(WorkDoneProgress::End(WorkDoneProgressEnd {
            message: Some(format!("{documents} documents indexed")),
        }));
    }

    fn send(&mut self, value: WorkDoneProgress) {
        let Some(token) = self.token.clone() else {
            return;
        };
        let params = ProgressParams {
            token,
            value: ProgressParamsValue::WorkDone(value),
        };
        if let Err(err) = self.client.progress(params) {
            tracing::warn!("failed to report scan progress: {err}");
        }
    }
}

pub(crate) struct ServerSnapshot<'a> {
    pub analysis: Analysis<'a>,
    pub config: &'a Config,
}

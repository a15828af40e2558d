use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracelens_core::{Case, Metadata, Point};

use super::protocol::{Incoming, Request};

/// File layout under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata(&self) -> PathBuf {
        self.root.join("metadata.json")
    }

    pub fn cases(&self, model: &str, dataset: &str) -> PathBuf {
        self.root.join("cases").join(format!("{model}_{dataset}.json"))
    }

    pub fn points(&self, model: &str) -> PathBuf {
        self.root.join("tsne").join(format!("{model}.json"))
    }

    pub fn for_request(&self, req: &Request) -> PathBuf {
        match req {
            Request::Metadata => self.metadata(),
            Request::Cases { model, dataset } => self.cases(model, dataset),
            Request::Points { model } => self.points(model),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("decode {}", path.display()))
}

pub fn load_metadata(path: &Path) -> Result<Metadata> {
    read_json(path)
}

pub fn load_cases(path: &Path) -> Result<Vec<Case>> {
    read_json(path)
}

pub fn load_points(path: &Path) -> Result<Vec<Point>> {
    read_json(path)
}

/// Reads and caches parsed files. Every successful file is parsed once per
/// process; failures are not cached so a fixed file can be retried.
#[derive(Debug)]
pub struct Loader {
    paths: DataPaths,
    metadata: Option<Arc<Metadata>>,
    cases: HashMap<(String, String), Arc<[Case]>>,
    points: HashMap<String, Arc<[Point]>>,
}

impl Loader {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            metadata: None,
            cases: HashMap::new(),
            points: HashMap::new(),
        }
    }

    pub fn handle(&mut self, req: Request) -> Incoming {
        let path = self.paths.for_request(&req);
        let source = path.display().to_string();
        match self.fetch(&req, &path) {
            Ok(inc) => inc,
            Err(e) => {
                tracing::warn!(source = %source, error = ?e, "data load failed");
                Incoming::error(source, req, format!("{e:#}"))
            }
        }
    }

    fn fetch(&mut self, req: &Request, path: &Path) -> Result<Incoming> {
        let source = path.display().to_string();
        let inc = match req {
            Request::Metadata => {
                let metadata = match self.metadata.clone() {
                    Some(m) => m,
                    None => {
                        let loaded = Arc::new(load_metadata(path)?);
                        self.metadata = Some(Arc::clone(&loaded));
                        loaded
                    }
                };
                Incoming::metadata(source, metadata)
            }
            Request::Cases { model, dataset } => {
                let key = (model.clone(), dataset.clone());
                let cases = match self.cases.get(&key).cloned() {
                    Some(c) => c,
                    None => {
                        let loaded: Arc<[Case]> = load_cases(path)?.into();
                        self.cases.insert(key, Arc::clone(&loaded));
                        loaded
                    }
                };
                tracing::debug!(model = %model, dataset = %dataset, count = cases.len(), "cases ready");
                Incoming::cases(source, model.clone(), dataset.clone(), cases)
            }
            Request::Points { model } => {
                let points = match self.points.get(model).cloned() {
                    Some(p) => p,
                    None => {
                        let loaded: Arc<[Point]> = load_points(path)?.into();
                        self.points.insert(model.clone(), Arc::clone(&loaded));
                        loaded
                    }
                };
                tracing::debug!(model = %model, count = points.len(), "points ready");
                Incoming::points(source, model.clone(), points)
            }
        };
        Ok(inc)
    }
}

/// Serve requests on a background thread until either channel closes.
pub fn spawn_loader(paths: DataPaths, requests: Receiver<Request>, tx: Sender<Incoming>) {
    let spawned = std::thread::Builder::new()
        .name("tracelens-loader".into())
        .spawn(move || {
            let mut loader = Loader::new(paths);
            for req in requests.iter() {
                if tx.send(loader.handle(req)).is_err() {
                    break;
                }
            }
            tracing::debug!("loader thread exiting");
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "failed to spawn loader thread");
    }
}

use std::sync::Arc;

use tracelens_core::{Case, Metadata, Point};

/// Work for the loader thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    Metadata,
    Cases { model: String, dataset: String },
    Points { model: String },
}

/// Loader output, tagged with the file it came from.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub source: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    Metadata(Arc<Metadata>),
    Cases {
        model: String,
        dataset: String,
        cases: Arc<[Case]>,
    },
    Points {
        model: String,
        points: Arc<[Point]>,
    },
    Error {
        request: Request,
        message: String,
    },
}

impl Incoming {
    pub fn metadata(source: String, metadata: Arc<Metadata>) -> Self {
        Self {
            source,
            kind: IncomingKind::Metadata(metadata),
        }
    }

    pub fn cases(source: String, model: String, dataset: String, cases: Arc<[Case]>) -> Self {
        Self {
            source,
            kind: IncomingKind::Cases {
                model,
                dataset,
                cases,
            },
        }
    }

    pub fn points(source: String, model: String, points: Arc<[Point]>) -> Self {
        Self {
            source,
            kind: IncomingKind::Points { model, points },
        }
    }

    pub fn error(source: String, request: Request, message: String) -> Self {
        Self {
            source,
            kind: IncomingKind::Error { request, message },
        }
    }
}

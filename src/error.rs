//! Rich diagnostic error types for the OWL-NETS engine.
//!
//! Each pipeline stage defines its own error type with miette `#[diagnostic]`
//! derives, so a malformed query result is reported with an error code and a
//! hint at which part of the input broke the abstraction.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for the OWL-NETS engine.
///
/// Every failure here is a precondition violation on the input. The engine
/// never returns partial output alongside an error.
#[derive(Debug, Error, Diagnostic)]
pub enum NetsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Statement graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("malformed triple on line {line}: \"{text}\"")]
    #[diagnostic(
        code(owl_nets::graph::malformed_triple),
        help(
            "A triple needs at least three whitespace-separated tokens: \
             subject, predicate and object. Tokens after the third are joined \
             back into the object."
        )
    )]
    MalformedTriple { line: usize, text: String },

    #[error("query produced no triples")]
    #[diagnostic(
        code(owl_nets::graph::empty),
        help("The statement graph is built from the query's triple patterns. Supply at least one.")
    )]
    EmptyQuery,

    #[error("statement graph has {components} connected components, expected 1")]
    #[diagnostic(
        code(owl_nets::graph::disconnected),
        help(
            "Every triple pattern of the query must be linked to the others through \
             shared subjects or objects. A query made of unrelated fragments cannot \
             be abstracted into a single entity graph."
        )
    )]
    Disconnected { components: usize },

    #[error(
        "statement graph has {edges} edges but the query has {triples} triples \
         (first collision: {subject} -> {object} via {kept} and {dropped})"
    )]
    #[diagnostic(
        code(owl_nets::graph::count_mismatch),
        help(
            "Two triples connect the same subject and object. The statement graph keeps \
             one predicate per node pair, so the second statement would be lost. \
             Rewrite the query so each subject/object pair appears once."
        )
    )]
    CountMismatch {
        triples: usize,
        edges: usize,
        subject: String,
        object: String,
        kept: String,
        dropped: String,
    },
}

// ---------------------------------------------------------------------------
// Entity classification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClassifyError {
    #[error("ambiguous entity source: \"{node}\" has {count} inbound marker edges")]
    #[diagnostic(
        code(owl_nets::classify::ambiguous_source),
        help(
            "An entity node must be denoted by exactly one identifier node. \
             Found inbound marker edges from: {sources}."
        )
    )]
    AmbiguousEntitySource {
        node: String,
        count: usize,
        sources: String,
    },
}

// ---------------------------------------------------------------------------
// Entity record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error(
        "entity variable \"{variable}\" has {keys} records but {values} distinct bound values"
    )]
    #[diagnostic(
        code(owl_nets::records::count_mismatch),
        help(
            "Every concrete value bound to an entity variable needs a label in at least \
             one result row. Check that the label placeholder for this variable was \
             added to the query and is bound."
        )
    )]
    KeyCountMismatch {
        variable: String,
        keys: usize,
        values: usize,
    },

    #[error("no label pattern for entity variable \"{variable}\"")]
    #[diagnostic(
        code(owl_nets::records::missing_label_pattern),
        help("Node patterns must be derived from the same abstraction the edges came from.")
    )]
    MissingLabelPattern { variable: String },

    #[error("failed to parse query results: {message}")]
    #[diagnostic(
        code(owl_nets::records::parse),
        help(
            "Query results must be SPARQL JSON: \
             {{\"results\": {{\"bindings\": [{{\"var\": {{\"value\": \"...\"}}}}]}}}}."
        )
    )]
    Parse { message: String },

    #[error("failed to read query results: {path}")]
    #[diagnostic(
        code(owl_nets::records::io),
        help("Check that the results file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Interchange export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("I/O error on {path}")]
    #[diagnostic(
        code(owl_nets::export::io),
        help("A filesystem operation failed. Check file paths and permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(owl_nets::export::serde),
        help(
            "The interchange document must have a \"metadata\" map and a \"network\" \
             object with \"nodes\" and \"edges\" arrays."
        )
    )]
    Serialization { message: String },
}

/// Convenience alias for engine results.
pub type NetsResult<T> = std::result::Result<T, NetsError>;

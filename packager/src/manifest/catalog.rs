//! Declared dependencies.
//!
//! [`Catalog`] is the unresolved form of the dependency manifest: install-time
//! entries plus named extras groups, each entry a requirement string with an
//! optional platform restriction. [`beam_catalog`] holds the SDK's own
//! declarations.

use super::predicate::PlatformPredicate;
use common::{InterpreterVersion, Platform};

/// One declared dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    /// A requirement applying on every platform (subject to its marker).
    Requirement(String),
    /// A requirement applying only where `predicate` holds.
    Restricted {
        /// Platforms the requirement applies to.
        predicate: PlatformPredicate,
        /// The requirement string.
        requirement: String,
    },
    /// Requirements that cannot be installed on one platform. There the
    /// whole bundle becomes a single empty placeholder.
    Bundle {
        /// The platform lacking the packages.
        excluded_on: Platform,
        /// The requirement strings.
        requirements: Vec<String>,
    },
}

impl CatalogEntry {
    /// A requirement for every platform.
    #[must_use]
    pub fn requirement(requirement: &str) -> Self {
        Self::Requirement(requirement.to_owned())
    }

    /// A requirement limited by `predicate`.
    #[must_use]
    pub fn restricted(predicate: PlatformPredicate, requirement: &str) -> Self {
        Self::Restricted {
            predicate,
            requirement: requirement.to_owned(),
        }
    }

    /// A bundle unavailable on `excluded_on`.
    #[must_use]
    pub fn bundle(excluded_on: Platform, requirements: &[&str]) -> Self {
        Self::Bundle {
            excluded_on,
            requirements: owned_strings(requirements),
        }
    }
}

/// A named extras group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraDecl {
    /// Group name, e.g. `gcp`.
    pub name: String,
    /// Groups whose resolved entries are appended to this one.
    pub includes: Vec<String>,
    /// The group's own entries.
    pub entries: Vec<CatalogEntry>,
}

impl ExtraDecl {
    /// A group of plain requirements with no inclusions.
    #[must_use]
    pub fn new(name: &str, requirements: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            includes: Vec::new(),
            entries: requirements
                .iter()
                .map(|requirement| CatalogEntry::requirement(requirement))
                .collect(),
        }
    }

    /// Adds inclusions of other groups.
    #[must_use]
    pub fn including(mut self, groups: &[&str]) -> Self {
        self.includes.extend(owned_strings(groups));
        self
    }
}

/// The complete set of declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Always-installed entries, in order.
    pub install: Vec<CatalogEntry>,
    /// Extras groups, in declaration order.
    pub extras: Vec<ExtraDecl>,
    /// Oldest supported interpreter; interpreter-gated variants must cover
    /// every version from here on.
    pub floor: InterpreterVersion,
}

fn owned_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Packages without 32-bit Windows wheels.
const COLUMNAR_BUNDLE: &[&str] = &["pyarrow>=3.0.0,<19.0.0", "pyarrow-hotfix<1"];

const INSTALL: &[&str] = &[
    "crcmod>=1.7,<2.0",
    "orjson>=3.9.7,<4",
    "dill>=0.3.1.1,<0.3.2",
    "fastavro>=0.23.6,<2",
    "fasteners>=0.3,<1.0",
    r#"grpcio>=1.33.1,<2,!=1.48.0,!=1.59.*,!=1.60.*,!=1.61.*,!=1.62.0,!=1.62.1,<1.66.0; python_version <= "3.12""#,
    r#"grpcio>=1.67.0; python_version >= "3.13""#,
    "hdfs>=2.1.0,<3.0.0",
    "httplib2>=0.8,<0.23.0",
    "jsonschema>=4.0.0,<5.0.0",
    "jsonpickle>=3.0.0,<4.0.0",
    "numpy>=1.14.3,<2.3.0",
    "objsize>=0.6.1,<0.8.0",
    "packaging>=22.0",
    "pymongo>=3.8.0,<5.0.0",
    "proto-plus>=1.7.1,<2",
    "protobuf>=3.20.3,<6.0.0.dev0,!=4.0.*,!=4.21.*,!=4.22.0,!=4.23.*,!=4.24.*",
    "pydot>=1.2.0,<2",
    "python-dateutil>=2.8.0,<3",
    "pytz>=2018.3",
    "redis>=5.0.0,<6",
    "regex>=2020.6.8",
    "requests>=2.32.4,<3.0.0",
    "sortedcontainers>=2.4.0",
    "typing-extensions>=3.7.0",
    "zstandard>=0.18.0,<1",
    "pyyaml>=3.12,<7.0.0",
    "pymilvus>=2.5.10,<3.0.0",
];

const DOCS: &[&str] = &[
    "jinja2>=3.0,<3.2",
    "Sphinx>=7.0.0,<8.0",
    "docstring-parser>=0.15,<1.0",
    "docutils>=0.18.1",
    "markdown",
    "pandas<2.3.0",
    "openai",
    "virtualenv-clone>=0.5,<1.0",
];

const TEST: &[&str] = &[
    "cloud-sql-python-connector[pg8000]>=1.0.0,<2.0.0",
    "docstring-parser>=0.15,<1.0",
    "freezegun>=0.3.12",
    "jinja2>=3.0,<3.2",
    "joblib>=1.0.1",
    "mock>=1.0.1,<6.0.0",
    "pandas<2.3.0",
    "parameterized>=0.7.1,<0.10.0",
    "pyhamcrest>=1.9,!=1.10.0,<3.0.0",
    "requests_mock>=1.7,<2.0",
    "tenacity>=8.0.0,<9",
    "pytest>=7.1.2,<8.0",
    "pytest-xdist>=2.5.0,<4",
    "pytest-timeout>=2.1.0,<3",
    "scikit-learn>=0.20.0",
    "sqlalchemy>=1.3,<3.0",
    r#"psycopg2-binary>=2.8.5,<2.9.10; python_version <= "3.9""#,
    r#"psycopg2-binary>=2.8.5,<3.0; python_version >= "3.10""#,
    "testcontainers[mysql,kafka,milvus]>=4.0.0,<5.0.0",
    "cryptography>=41.0.2",
    "hypothesis>5.0.0,<7.0.0",
    "virtualenv-clone>=0.5,<1.0",
    "mysql-connector-python>=9.3.0",
    "python-tds>=1.16.1",
    "sqlalchemy-pytds>=1.0.2",
    "oracledb>=3.1.1",
];

const GCP: &[&str] = &[
    "cachetools>=3.1.0,<7",
    "google-api-core>=2.0.0,<3",
    r#"google-apitools>=0.5.31,<0.5.32; python_version <= "3.12""#,
    r#"google-apitools>=0.5.32,<0.5.33; python_version >= "3.13""#,
    "google-auth>=1.18.0,<3",
    "google-auth-httplib2>=0.1.0,<0.3.0",
    "google-cloud-datastore>=2.0.0,<3",
    "google-cloud-pubsub>=2.1.0,<3",
    "google-cloud-pubsublite>=1.2.0,<2",
    "google-cloud-storage>=2.18.2,<3",
    "google-cloud-bigquery>=2.0.0,<4",
    "google-cloud-bigquery-storage>=2.6.3,<3",
    "google-cloud-core>=2.0.0,<3",
    "google-cloud-bigtable>=2.19.0,<3",
    "google-cloud-spanner>=3.0.0,<4",
    "google-cloud-dlp>=3.0.0,<4",
    "google-cloud-language>=2.0,<3",
    "google-cloud-videointelligence>=2.0,<3",
    "google-cloud-vision>=2,<4",
    "google-cloud-recommendations-ai>=0.1.0,<0.11.0",
    "google-cloud-aiplatform>=1.26.0, < 2.0",
    "keyrings.google-artifactregistry-auth",
];

const INTERACTIVE: &[&str] = &[
    "facets-overview>=1.1.0,<2",
    "google-cloud-dataproc>=5.0.0,<6",
    "ipython>=7,<9",
    "ipykernel>=6,<7",
    "ipywidgets>=8,<9",
    "jupyter-client>=6.1.11,!=6.1.13,<8.2.1",
    "timeloop>=1.0.2,<2",
    "nbformat>=5.0.5,<6",
    "nbconvert>=6.2.0,<8",
];

const INTERACTIVE_TEST: &[&str] = &[
    "needle>=0.5.0,<1",
    "chromedriver-binary>=117,<118",
    "pillow>=7.1.1,<10",
    "urllib3<2,>=1.21.1",
];

const ML_TEST: &[&str] = &[
    "datatable",
    "embeddings",
    "langchain",
    "onnxruntime",
    "sentence-transformers",
    "skl2onnx",
    "pillow",
    "pyod",
    "tensorflow",
    "tensorflow-hub",
    "tensorflow-transform",
    "tf2onnx",
    "torch",
    "transformers",
];

const P312_ML_TEST: &[&str] = &[
    "datatable",
    "embeddings",
    "onnxruntime",
    "langchain",
    "sentence-transformers",
    "skl2onnx",
    "pillow",
    "pyod",
    "tensorflow",
    "tensorflow-hub",
    "tf2onnx",
    "torch",
    "transformers",
];

const AZURE: &[&str] = &[
    "azure-storage-blob>=12.3.2,<13",
    "azure-core>=1.7.0,<2",
    "azure-identity>=1.12.0,<2",
];

const DATAFRAME: &[&str] = &["pandas>=1.4.3,!=1.5.0,!=1.5.1,<2.3"];

const DASK: &[&str] = &["distributed >= 2024.4.2", "dask >= 2024.4.2"];

const YAML: &[&str] = &[
    "docstring-parser>=0.15,<1.0",
    "jinja2>=3.0,<3.2",
    "virtualenv-clone>=0.5,<1.0",
    r#"js2py>=0.74,<1; python_version<"3.12""#,
];

const TRANSFORMERS: &[&str] = &[
    "transformers>=4.28.0,<4.49.0",
    "tensorflow>=2.12.0",
    "torch>=1.9.0",
];

const ONNX: &[&str] = &[
    "onnxruntime==1.13.1",
    "torch==1.13.1",
    "tensorflow==2.11.0",
    "tf2onnx==1.13.0",
    "skl2onnx==1.13",
    "transformers==4.25.1",
];

/// The SDK's declared dependencies.
#[must_use]
pub fn beam_catalog() -> Catalog {
    let mut install: Vec<CatalogEntry> = INSTALL
        .iter()
        .map(|requirement| CatalogEntry::requirement(requirement))
        .collect();
    install.push(CatalogEntry::bundle(Platform::windows_32(), COLUMNAR_BUNDLE));

    let extras = vec![
        ExtraDecl::new("docs", DOCS),
        ExtraDecl::new("test", TEST),
        ExtraDecl::new("gcp", GCP),
        ExtraDecl::new("interactive", INTERACTIVE).including(&["dataframe"]),
        ExtraDecl::new("interactive_test", INTERACTIVE_TEST),
        ExtraDecl::new("ml_test", ML_TEST),
        ExtraDecl::new("p312_ml_test", P312_ML_TEST),
        ExtraDecl::new("aws", &["boto3>=1.9,<2"]),
        ExtraDecl::new("azure", AZURE),
        ExtraDecl::new("dataframe", DATAFRAME),
        ExtraDecl::new("dask", DASK),
        ExtraDecl::new("yaml", YAML).including(&["dataframe"]),
        ExtraDecl::new("torch", &["torch>=1.9.0,<2.8.0"]),
        ExtraDecl::new("tensorflow", &["tensorflow>=2.12rc1,<2.17"]),
        ExtraDecl::new("transformers", TRANSFORMERS),
        ExtraDecl::new("tft", &["tensorflow_transform>=1.14.0,<1.15.0"]),
        ExtraDecl::new("onnx", ONNX),
        ExtraDecl::new("xgboost", &["xgboost>=1.6.0,<2.1.3", "datatable==1.0.0"]),
        ExtraDecl::new("tensorflow-hub", &["tensorflow-hub>=0.14.0,<0.16.0"]),
    ];

    Catalog {
        install,
        extras,
        floor: crate::metadata::SUPPORTED_FLOOR,
    }
}

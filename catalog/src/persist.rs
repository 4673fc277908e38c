use crate::{Book, Catalog, PopularEntry};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_books: usize,
    pub num_popular: usize,
    pub num_titles: usize,
    pub created_at: String,
}

/// On-disk form of the similarity matrix, kept apart from the pivot titles.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixFile {
    pub rows: u32,
    pub cols: u32,
    pub data: Vec<f32>,
}

pub struct CatalogPaths {
    pub root: PathBuf,
}

impl CatalogPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn books(&self) -> PathBuf { self.root.join("books.bin") }
    pub fn popular(&self) -> PathBuf { self.root.join("popular.bin") }
    pub fn pivot(&self) -> PathBuf { self.root.join("pivot.bin") }
    pub fn similarity(&self) -> PathBuf { self.root.join("similarity.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_bin<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

pub fn save_books(paths: &CatalogPaths, books: &[Book]) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.books(), books)
}

pub fn load_books(paths: &CatalogPaths) -> Result<Vec<Book>> {
    read_bin(&paths.books())
}

pub fn save_popular(paths: &CatalogPaths, popular: &[PopularEntry]) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.popular(), popular)
}

pub fn load_popular(paths: &CatalogPaths) -> Result<Vec<PopularEntry>> {
    read_bin(&paths.popular())
}

pub fn save_pivot(paths: &CatalogPaths, titles: &[String]) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.pivot(), titles)
}

pub fn load_pivot(paths: &CatalogPaths) -> Result<Vec<String>> {
    read_bin(&paths.pivot())
}

pub fn save_similarity(paths: &CatalogPaths, matrix: &MatrixFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(&paths.similarity(), matrix)
}

pub fn load_similarity(paths: &CatalogPaths) -> Result<MatrixFile> {
    let matrix: MatrixFile = read_bin(&paths.similarity())?;
    if matrix.data.len() != matrix.rows as usize * matrix.cols as usize {
        bail!(
            "{}: header says {}x{} but holds {} scores",
            paths.similarity().display(),
            matrix.rows,
            matrix.cols,
            matrix.data.len()
        );
    }
    Ok(matrix)
}

pub fn save_meta(paths: &CatalogPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &CatalogPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf).with_context(|| format!("decoding {}", paths.meta().display()))?;
    Ok(meta)
}

/// Write every artifact of `catalog` plus a `meta.json` describing them.
pub fn save_catalog(paths: &CatalogPaths, catalog: &Catalog, created_at: String) -> Result<()> {
    let index = catalog.similarity_index();
    let n = u32::try_from(index.dim()).context("similarity matrix too large for the artifact format")?;
    save_books(paths, catalog.books())?;
    save_popular(paths, catalog.popular())?;
    save_pivot(paths, &index.titles)?;
    save_similarity(paths, &MatrixFile { rows: n, cols: n, data: index.scores.clone() })?;
    let meta = MetaFile {
        version: ARTIFACT_VERSION,
        num_books: catalog.books().len(),
        num_popular: catalog.popular().len(),
        num_titles: index.dim(),
        created_at,
    };
    save_meta(paths, &meta)
}

/// Load and validate every artifact. Any error here means the server must not start.
pub fn load_catalog(paths: &CatalogPaths) -> Result<Catalog> {
    let meta = load_meta(paths)?;
    if meta.version != ARTIFACT_VERSION {
        bail!("unsupported artifact version {} (expected {ARTIFACT_VERSION})", meta.version);
    }
    let books = load_books(paths)?;
    let popular = load_popular(paths)?;
    let titles = load_pivot(paths)?;
    let matrix = load_similarity(paths)?;

    if books.len() != meta.num_books || popular.len() != meta.num_popular || titles.len() != meta.num_titles {
        bail!(
            "artifact counts disagree with meta.json: books {}/{}, popular {}/{}, titles {}/{}",
            books.len(), meta.num_books, popular.len(), meta.num_popular, titles.len(), meta.num_titles
        );
    }
    if matrix.rows as usize != titles.len() || matrix.cols as usize != titles.len() {
        bail!("similarity matrix is {}x{} but pivot has {} titles", matrix.rows, matrix.cols, titles.len());
    }

    let index = crate::SimilarityIndex { titles, scores: matrix.data };
    let catalog = Catalog::new(books, popular, index)?;
    tracing::info!(
        books = catalog.books().len(),
        popular = catalog.popular().len(),
        titles = catalog.titles().len(),
        root = %paths.root.display(),
        "catalog loaded"
    );
    Ok(catalog)
}

//! # band.conf 生成命令实现
//!
//! ## 功能
//! - 选择结构来源（phonopy_disp.yaml 优先，POSCAR 后备）
//! - 生成高对称路径并保留 3 位小数
//! - 合并 DIM / SYMMETRY_TOLERANCE，写出 band.conf 与 qpoints.yaml
//!
//! 所有计算在写文件之前完成；两个输出先写到临时文件，已有文件改名为备份后再替换，
//! 任一步失败都恢复原有文件，不会留下半成品。同一目录的并发调用会互相覆盖输出，调用方需自行串行化。
//!
//! ## 依赖关系
//! - 使用 `cli/` 定义的参数
//! - 使用 `parsers/`, `models/`, `symmetry/`
//! - 使用 `utils/output.rs`

use crate::cli::Cli;
use crate::error::{BandPathError, Result};
use crate::models::{BandConfig, Crystal, KPath, PriorMetadata};
use crate::parsers::phonopy_disp::PHONOPY_DISP_FILE;
use crate::parsers::StructureSource;
use crate::symmetry::{DerivedPath, KPathProvider, StandardKPath};
use crate::utils::output;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const BAND_CONF_FILE: &str = "band.conf";
pub const QPOINTS_FILE: &str = "qpoints.yaml";

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct Request {
    pub dir: PathBuf,
    pub poscar: String,
    pub dim: Option<String>,
    pub symmetry_tolerance: Option<String>,
}

impl From<Cli> for Request {
    fn from(cli: Cli) -> Self {
        Request {
            dir: cli.path,
            poscar: cli.poscar,
            dim: cli.dim,
            symmetry_tolerance: cli.symmetry_tolerance,
        }
    }
}

/// 计算完成、尚未写盘的结果
#[derive(Debug)]
pub struct Prepared {
    pub source: StructureSource,
    pub crystal: Crystal,
    pub kpath: KPath,
    pub config: BandConfig,
    pub lattice: Option<String>,
}

/// 写出的文件
#[derive(Debug)]
pub struct Written {
    pub band_conf: PathBuf,
    pub qpoints: PathBuf,
}

/// 执行命令
pub fn execute(args: Cli) -> Result<()> {
    output::print_header("Generating phonopy band.conf");

    let request = Request::from(args);
    let prepared = prepare(&request, &StandardKPath::default())?;

    output::print_info(&format!(
        "Structure: {} [{}, {} atoms] from {}",
        prepared.crystal.name,
        prepared.crystal.formula(),
        prepared.crystal.atoms.len(),
        prepared.source
    ));
    output::print_info(&format!(
        "Species: {}",
        prepared.config.atom_names().join(" ")
    ));
    if let Some(lattice) = &prepared.lattice {
        output::print_info(&format!(
            "Detected {}, {} path segment(s)",
            lattice,
            prepared.config.segment_count()
        ));
    }

    println!("{}", prepared.config.band_line());
    println!("{}", prepared.config.band_labels_line());

    let written = prepared.write(&request.dir)?;
    if KPath::read_yaml(&written.qpoints)? != prepared.kpath {
        output::print_warning(&format!(
            "{} does not reload to the same q-path",
            written.qpoints.display()
        ));
    }
    output::print_info(&format!("q-points saved to {}", written.qpoints.display()));
    output::print_done(&format!(
        "Please see {} and run phonopy.",
        written.band_conf.display()
    ));

    Ok(())
}

/// 完成全部计算，不写任何文件
pub fn prepare(request: &Request, provider: &dyn KPathProvider) -> Result<Prepared> {
    let source = StructureSource::select(&request.dir, &request.poscar)?;

    // 没有 phonopy_disp.yaml 时先检查命令行参数，再解析结构
    let from_request = match &source {
        StructureSource::FromPriorMetadata(path) => {
            if request.dim.is_some() || request.symmetry_tolerance.is_some() {
                output::print_warning(&format!(
                    "--dim/--symmetry-tolerance ignored, using values from {}",
                    path.display()
                ));
            }
            None
        }
        StructureSource::FromStructureFile(_) => Some(metadata_from_request(request)?),
    };

    let loaded = source.load()?;
    let crystal = loaded.crystal;
    let metadata = match loaded.metadata.or(from_request) {
        Some(metadata) => metadata,
        None => return Err(missing_metadata(request)),
    };

    let DerivedPath { kpath, lattice } = provider.derive(&crystal)?;
    let kpath = kpath.rounded();
    kpath.validate()?;
    let config = BandConfig::build(&kpath, &crystal, &metadata)?;

    Ok(Prepared {
        source,
        crystal,
        kpath,
        config,
        lattice,
    })
}

/// 没有 phonopy_disp.yaml 时，DIM 与 SYMMETRY_TOLERANCE 必须由命令行给出
fn metadata_from_request(request: &Request) -> Result<PriorMetadata> {
    match (&request.dim, &request.symmetry_tolerance) {
        (Some(dim), Some(tol)) => Ok(PriorMetadata {
            dim: dim.clone(),
            symmetry_tolerance: tol.clone(),
        }),
        _ => Err(missing_metadata(request)),
    }
}

fn missing_metadata(request: &Request) -> BandPathError {
    BandPathError::FileNotFound {
        path: format!(
            "{} (needed for DIM and SYMMETRY_TOLERANCE; or pass --dim and --symmetry-tolerance)",
            request.dir.join(PHONOPY_DISP_FILE).display()
        ),
    }
}

impl Prepared {
    /// 写出 band.conf 与 qpoints.yaml（覆盖已有文件）
    pub fn write(&self, dir: &Path) -> Result<Written> {
        let band_conf = dir.join(BAND_CONF_FILE);
        let qpoints = dir.join(QPOINTS_FILE);

        let payloads = [
            (band_conf.clone(), self.config.render()),
            (qpoints.clone(), self.kpath.to_yaml_string()?),
        ];
        write_all_or_nothing(&payloads)?;

        Ok(Written { band_conf, qpoints })
    }
}

/// 先全部写入临时文件，再逐个替换目标
///
/// 已有的目标先改名为备份，任何一步失败都会撤销已替换的文件并恢复备份。
fn write_all_or_nothing(payloads: &[(PathBuf, String)]) -> Result<()> {
    for (target, _) in payloads {
        ensure_replaceable(target)?;
    }

    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(payloads.len());
    for (target, content) in payloads {
        let tmp = staging_path(target);
        if let Err(e) = fs::write(&tmp, content) {
            discard(&staged);
            let _ = fs::remove_file(&tmp);
            return Err(BandPathError::FileWriteError {
                path: target.display().to_string(),
                source: e,
            });
        }
        staged.push((tmp, target.as_path()));
    }

    commit(&staged)
}

/// 目标必须不存在或是普通文件
fn ensure_replaceable(target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => Err(BandPathError::FileWriteError {
            path: target.display().to_string(),
            source: io::Error::new(io::ErrorKind::Other, "target is a directory"),
        }),
        _ => Ok(()),
    }
}

fn commit(staged: &[(PathBuf, &Path)]) -> Result<()> {
    let mut backups: Vec<(PathBuf, &Path)> = Vec::new();
    let mut placed: Vec<&Path> = Vec::new();

    for (tmp, target) in staged {
        if let Err(e) = replace(tmp, *target, &mut backups) {
            rollback(&placed, &backups);
            discard(staged);
            return Err(BandPathError::FileWriteError {
                path: target.display().to_string(),
                source: e,
            });
        }
        placed.push(*target);
    }

    for (backup, _) in &backups {
        let _ = fs::remove_file(backup);
    }
    Ok(())
}

fn replace<'a>(
    tmp: &Path,
    target: &'a Path,
    backups: &mut Vec<(PathBuf, &'a Path)>,
) -> io::Result<()> {
    if fs::symlink_metadata(target).is_ok() {
        let backup = hidden_sibling(target, "bak");
        fs::rename(target, &backup)?;
        backups.push((backup, target));
    }
    fs::rename(tmp, target)
}

fn rollback(placed: &[&Path], backups: &[(PathBuf, &Path)]) {
    for target in placed {
        let _ = fs::remove_file(target);
    }
    for (backup, target) in backups {
        let _ = fs::rename(backup, target);
    }
}

fn staging_path(target: &Path) -> PathBuf {
    hidden_sibling(target, "tmp")
}

fn hidden_sibling(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}", name, suffix))
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

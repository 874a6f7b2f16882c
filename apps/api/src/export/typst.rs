//! `PdfExporter` backed by the `typst` command-line compiler.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::markup;
use super::{ExportError, PdfExporter};
use crate::render::layout::Block;
use crate::render::Layout;

const SOURCE_FILE: &str = "resume.typ";
const OUTPUT_FILE: &str = "resume.pdf";
const PHOTO_STEM: &str = "photo";
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub struct TypstExporter {
    bin: PathBuf,
    timeout: Duration,
}

impl TypstExporter {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// Writes the header photo next to the source. A photo that cannot be loaded is left out
    /// of the export rather than failing it.
    async fn materialize_photo(&self, layout: &Layout, dir: &Path) -> Option<String> {
        let source = layout.blocks().find_map(|block| match block {
            Block::Header(header) => header.photo.as_ref().map(|p| p.source.clone()),
            _ => None,
        })?;

        let loaded = if source.starts_with("data:") {
            decode_data_uri(&source)
        } else if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch(&source).await
        } else {
            None
        };

        let Some((extension, bytes)) = loaded else {
            warn!("Profile photo could not be loaded, exporting without it");
            return None;
        };

        let name = format!("{PHOTO_STEM}.{extension}");
        match tokio::fs::write(dir.join(&name), bytes).await {
            Ok(()) => Some(name),
            Err(e) => {
                warn!("Failed to write profile photo for export: {e}");
                None
            }
        }
    }

    /// Fetches a photo from a public host. The connection is pinned to the address that was
    /// checked, redirects are refused and the body is capped at `MAX_PHOTO_BYTES`.
    async fn fetch(&self, url: &str) -> Option<(&'static str, Vec<u8>)> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let addr = match resolve_public(&parsed).await {
            Ok(addr) => addr,
            Err(reason) => {
                warn!("Refusing profile photo from {host}: {reason}");
                return None;
            }
        };

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.timeout)
            .resolve(&host, addr)
            .build()
            .map_err(|e| warn!("Failed to build photo client: {e}"))
            .ok()?;

        let mut response = match client.get(parsed).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Profile photo fetch returned {}", r.status());
                return None;
            }
            Err(e) => {
                warn!("Profile photo fetch failed: {e}");
                return None;
            }
        };
        if response
            .content_length()
            .is_some_and(|len| len > MAX_PHOTO_BYTES as u64)
        {
            warn!("Profile photo exceeds {MAX_PHOTO_BYTES} bytes");
            return None;
        }

        let extension = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(image_extension)
            .or_else(|| url.rsplit_once('.').and_then(|(_, ext)| extension_for(ext)))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.ok()? {
            if bytes.len() + chunk.len() > MAX_PHOTO_BYTES {
                warn!("Profile photo exceeds {MAX_PHOTO_BYTES} bytes");
                return None;
            }
            bytes.extend_from_slice(&chunk);
        }
        Some((extension, bytes))
    }

    async fn compile(&self, dir: &Path) -> Result<Vec<u8>, ExportError> {
        let child = Command::new(&self.bin)
            .arg("compile")
            .arg(SOURCE_FILE)
            .arg(OUTPUT_FILE)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ExportError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExportError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ExportError::Compile {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(tokio::fs::read(dir.join(OUTPUT_FILE)).await?)
    }
}

#[async_trait]
impl PdfExporter for TypstExporter {
    async fn export(&self, layout: &Layout) -> Result<Vec<u8>, ExportError> {
        let workspace = tempfile::tempdir()?;
        let photo = self.materialize_photo(layout, workspace.path()).await;

        let source = markup::document(layout, photo.as_deref());
        tokio::fs::write(workspace.path().join(SOURCE_FILE), source).await?;
        debug!("Compiling export in {}", workspace.path().display());

        let pdf = self.compile(workspace.path()).await?;
        info!("Exported {} byte PDF", pdf.len());
        Ok(pdf)
    }
}

/// Resolves the URL's host and accepts it only when every address is publicly routable.
async fn resolve_public(url: &reqwest::Url) -> Result<SocketAddr, &'static str> {
    let host = url.host_str().ok_or("missing host")?;
    let port = url.port_or_known_default().ok_or("missing port")?;
    let literal = host.trim_start_matches('[').trim_end_matches(']');

    let addrs: Vec<SocketAddr> = match literal.parse::<IpAddr>() {
        Ok(ip) => vec![SocketAddr::new(ip, port)],
        Err(_) => tokio::net::lookup_host((host, port))
            .await
            .map_err(|_| "host does not resolve")?
            .collect(),
    };

    match addrs.first() {
        None => Err("host does not resolve"),
        Some(_) if addrs.iter().any(|a| !is_public(a.ip())) => {
            Err("host resolves to a non-public address")
        }
        Some(addr) => Ok(*addr),
    }
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => {
                let first = v6.segments()[0];
                !(v6.is_loopback()
                    || v6.is_unspecified()
                    || v6.is_multicast()
                    || first & 0xfe00 == 0xfc00
                    || first & 0xffc0 == 0xfe80)
            }
        },
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_multicast()
        || ip.is_documentation()
        || a == 0
        || (a == 100 && b & 0xc0 == 64))
}

/// `data:image/png;base64,...` → (`"png"`, bytes).
fn decode_data_uri(uri: &str) -> Option<(&'static str, Vec<u8>)> {
    let (meta, payload) = uri.strip_prefix("data:")?.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let extension = image_extension(mime)?;
    let bytes = BASE64.decode(payload.trim()).ok()?;
    Some((extension, bytes))
}

fn image_extension(mime: &str) -> Option<&'static str> {
    match mime.split(';').next()?.trim() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn extension_for(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "gif" => Some("gif"),
        "svg" => Some("svg"),
        "webp" => Some("webp"),
        _ => None,
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};
use url::{ParseError, Url};

/// URL错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// 不是合法的绝对URL
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
}

impl UrlError {
    fn malformed(url: &str, reason: impl ToString) -> Self {
        UrlError::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// 解析带主机名的绝对URL
pub fn parse_absolute(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::malformed(raw, e))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::malformed(raw, "missing host")),
    }
}

/// 规范化URL
///
/// 去掉用户信息、查询串、片段以及空查询标记，只保留 scheme + host + path。
///
/// # 返回值
///
/// * `Ok(String)` - 规范化后的URL
/// * `Err(UrlError)` - 输入不是合法的绝对URL，调用方应放弃该任务且不重试
pub fn normalize(raw: &str) -> Result<String, UrlError> {
    let mut url = parse_absolute(raw)?;
    // 有主机名的URL总能清除用户信息
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

/// 页面中提取到的链接目标
///
/// 原始 href 要么是绝对URL，要么是没有 scheme 的相对引用。
/// `url::Url` 无法表示相对引用，所以相对部分在这里单独保存。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCandidate {
    /// 带 scheme 的绝对URL
    Absolute(Url),
    /// 相对引用
    Relative(RelativeRef),
}

/// 相对引用的各组成部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeRef {
    raw: String,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl LinkCandidate {
    /// 解析原始 href
    ///
    /// 无法解析的 href 返回错误，调用方丢弃即可。
    pub fn parse(href: &str) -> Result<Self, UrlError> {
        let href = href.trim();
        match Url::parse(href) {
            Ok(url) => Ok(LinkCandidate::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => Self::parse_relative(href),
            Err(e) => Err(UrlError::malformed(href, e)),
        }
    }

    fn parse_relative(href: &str) -> Result<Self, UrlError> {
        // 协议相对引用 //host/path 保留自身的主机名
        if href.starts_with("//") {
            let url = Url::parse(&format!("http:{}", href))
                .map_err(|e| UrlError::malformed(href, e))?;
            // http 会吞掉显式的 :80，端口按无默认端口的 scheme 再取一次
            let port = Url::parse(&format!("rel:{}", href))
                .ok()
                .and_then(|u| u.port());
            return Ok(LinkCandidate::Relative(RelativeRef {
                raw: href.to_string(),
                host: url.host_str().map(str::to_string),
                port,
                path: url.path().to_string(),
                query: url.query().map(str::to_string),
                fragment: url.fragment().map(str::to_string),
            }));
        }

        let (rest, fragment) = match href.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (href, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        Ok(LinkCandidate::Relative(RelativeRef {
            raw: href.to_string(),
            host: None,
            port: None,
            path: path.to_string(),
            query,
            fragment,
        }))
    }

    /// 主机名，相对引用通常没有
    pub fn host(&self) -> Option<&str> {
        match self {
            LinkCandidate::Absolute(url) => url.host_str().filter(|h| !h.is_empty()),
            LinkCandidate::Relative(rel) => rel.host.as_deref(),
        }
    }

    /// 端口。绝对URL缺省时取其 scheme 的默认端口，
    /// 协议相对引用缺省时返回 `inherited_default`
    pub fn port_or(&self, inherited_default: Option<u16>) -> Option<u16> {
        match self {
            LinkCandidate::Absolute(url) => url.port_or_known_default(),
            LinkCandidate::Relative(rel) => rel.port.or(inherited_default),
        }
    }

    /// 路径。`mailto:` 这类不透明URL的路径视为空
    pub fn path(&self) -> &str {
        match self {
            LinkCandidate::Absolute(url) if url.cannot_be_a_base() => "",
            LinkCandidate::Absolute(url) => url.path(),
            LinkCandidate::Relative(rel) => &rel.path,
        }
    }

    /// 原始文本，用于日志
    pub fn as_str(&self) -> &str {
        match self {
            LinkCandidate::Absolute(url) => url.as_str(),
            LinkCandidate::Relative(rel) => &rel.raw,
        }
    }
}

/// 将候选链接转为绝对URL
///
/// 没有主机名的候选继承 `base` 的 scheme 和主机（含端口），
/// 包括 `file:///x` 这类带 scheme 但主机为空的URL。
/// 协议相对的候选只继承 scheme。候选的路径和查询串原样保留，
/// 不按 RFC 3986 与 base 的路径合并。
pub fn to_absolute(base: &Url, candidate: &LinkCandidate) -> Result<Url, UrlError> {
    match candidate {
        LinkCandidate::Absolute(url) if candidate.host().is_none() => {
            Ok(rebase(base, candidate.path(), url.query(), url.fragment()))
        }
        LinkCandidate::Absolute(url) => Ok(url.clone()),
        LinkCandidate::Relative(rel) if rel.host.is_some() => {
            let raw = format!("{}:{}", base.scheme(), rel.raw);
            Url::parse(&raw).map_err(|e| UrlError::malformed(&rel.raw, e))
        }
        LinkCandidate::Relative(rel) => Ok(rebase(
            base,
            &rel.path,
            rel.query.as_deref(),
            rel.fragment.as_deref(),
        )),
    }
}

fn rebase(base: &Url, path: &str, query: Option<&str>, fragment: Option<&str>) -> Url {
    let mut url = base.clone();
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_path(path);
    url.set_query(query);
    url.set_fragment(fragment);
    url
}

/// 链接谓词
///
/// 纯函数式的判定，多个谓词按顺序以逻辑与组合。
pub trait LinkPredicate: Send + Sync {
    /// 谓词名称，用于日志和指标标签
    fn name(&self) -> &'static str;

    /// 是否接受该候选链接
    fn accepts(&self, candidate: &LinkCandidate) -> bool;
}

/// 同域谓词
///
/// 候选没有主机名，或主机名与端口都与 base 相等时接受。
/// 端口缺省时按默认端口比较，不做子域或后缀匹配。
#[derive(Debug, Clone)]
pub struct SameDomain {
    host: Option<String>,
    port: Option<u16>,
    scheme_default_port: Option<u16>,
}

impl SameDomain {
    pub fn new(base: &Url) -> Self {
        let mut without_port = base.clone();
        let _ = without_port.set_port(None);
        Self {
            host: base.host_str().map(str::to_string),
            port: base.port_or_known_default(),
            scheme_default_port: without_port.port_or_known_default(),
        }
    }
}

impl LinkPredicate for SameDomain {
    fn name(&self) -> &'static str {
        "same_domain"
    }

    fn accepts(&self, candidate: &LinkCandidate) -> bool {
        match candidate.host() {
            None => true,
            Some(host) => {
                self.host.as_deref() == Some(host)
                    && candidate.port_or(self.scheme_default_port) == self.port
            }
        }
    }
}

/// 非空谓词
///
/// 拒绝既没有主机名也没有路径的候选，例如空 href 或仅有片段的 `#top`。
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

impl LinkPredicate for NonEmpty {
    fn name(&self) -> &'static str {
        "non_empty"
    }

    fn accepts(&self, candidate: &LinkCandidate) -> bool {
        candidate.host().is_some() || !candidate.path().is_empty()
    }
}

/// 链接过滤器
///
/// 有序的谓词集合，全部接受才保留。输入顺序保持不变，
/// 每次拒绝都会记录日志和指标，从不返回错误。
#[derive(Default)]
pub struct LinkFilter {
    predicates: Vec<Box<dyn LinkPredicate>>,
}

impl LinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个谓词
    pub fn with(mut self, predicate: impl LinkPredicate + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// 执行过滤
    pub fn apply(&self, candidates: Vec<LinkCandidate>) -> Vec<LinkCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| {
                match self.predicates.iter().find(|p| !p.accepts(candidate)) {
                    Some(rejected_by) => {
                        debug!(
                            url = candidate.as_str(),
                            predicate = rejected_by.name(),
                            "URL ignored, failed to match predicate"
                        );
                        counter!("crawlgraph_links_rejected_total", "predicate" => rejected_by.name())
                            .increment(1);
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }
}

/// 去重：同一批中已出现过的URL在后续位置被丢弃
pub fn dedup(urls: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| {
            let fresh = seen.insert(url.as_str().to_string());
            if !fresh {
                debug!(url = url.as_str(), "Duplicate URL dropped");
                counter!("crawlgraph_links_rejected_total", "predicate" => "duplicate")
                    .increment(1);
            }
            fresh
        })
        .collect()
}

/// 将页面上的原始链接整理为子URL列表
///
/// 依次执行：解析、同域过滤、非空过滤、相对转绝对、去重。
pub fn resolve_child_links(base: &Url, raw_links: &[String]) -> Vec<Url> {
    let candidates = raw_links
        .iter()
        .filter_map(|href| match LinkCandidate::parse(href) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!("Skipping unparseable href: {}", e);
                None
            }
        })
        .collect();

    let filter = LinkFilter::new().with(SameDomain::new(base)).with(NonEmpty);

    let absolute = filter
        .apply(candidates)
        .iter()
        .filter_map(|candidate| match to_absolute(base, candidate) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Skipping link that cannot be made absolute: {}", e);
                None
            }
        })
        .collect();

    dedup(absolute)
}

#[cfg(test)]
#[path = "url_canonicalizer_test.rs"]
mod tests;

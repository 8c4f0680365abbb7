use hudsucker::{
    hyper::{header, http::uri::Authority, Body, Method, Request, Response, StatusCode},
    HttpContext, HttpHandler, RequestOrResponse,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::{RequestDescriptor, ResourceType};
use crate::controller::Decision;
use crate::service::CatcherHandle;
use crate::session::NavigationEvent;

const SEC_FETCH_DEST: &str = "sec-fetch-dest";
const SEC_FETCH_MODE: &str = "sec-fetch-mode";

/// Proxy request handler that feeds browser traffic to the capture service.
///
/// Top-level page loads are reported as navigations. `GET` requests for media
/// or scripted fetches are offered to the interception controller and either
/// forwarded or answered locally with an empty `403`.
#[derive(Clone)]
pub struct CatchHandler {
    catcher: CatcherHandle,
}

impl CatchHandler {
    pub fn new(catcher: CatcherHandle) -> Self {
        Self { catcher }
    }
}

/// `host:port` with the scheme's default port removed.
fn canonical_authority<'a>(scheme: &str, authority: &'a Authority) -> &'a str {
    match (scheme, authority.port_u16()) {
        ("https", Some(443)) | ("http", Some(80)) => authority.host(),
        _ => authority.as_str(),
    }
}

/// Absolute URL of a proxied request, as the page requested it.
///
/// Origin-form URIs are completed from the `Host` header. Tunnelled HTTPS
/// requests carry an explicit `:443`, which is dropped along with `:80`
/// for plain HTTP.
pub fn absolute_url(req: &Request<Body>) -> String {
    let uri = req.uri();
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{}://{}{}", scheme, canonical_authority(scheme, authority), path);
    }
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match host.parse::<Authority>() {
        Ok(authority) => format!("https://{}{}", canonical_authority("https", &authority), path),
        Err(_) => format!("https://{}{}", host, path),
    }
}

fn header_str<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Resource type declared through Fetch Metadata, or inferred from the URL
/// and `Range` header when the browser sent none.
pub fn resource_type(req: &Request<Body>) -> ResourceType {
    match header_str(req, SEC_FETCH_DEST) {
        Some(dest) => ResourceType::from_fetch_dest(Some(dest)),
        None => ResourceType::infer(
            &absolute_url(req),
            req.headers().contains_key(header::RANGE),
        ),
    }
}

/// A top-level document navigation, as opposed to a frame or subresource.
pub fn is_top_level_navigation(req: &Request<Body>) -> bool {
    header_str(req, SEC_FETCH_MODE).is_some_and(|m| m.eq_ignore_ascii_case("navigate"))
        && resource_type(req) == ResourceType::MainFrame
}

/// Build the descriptor for a request. Header values that are not valid
/// text are left out.
pub fn describe(req: &Request<Body>) -> RequestDescriptor {
    let headers = req
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
        .collect();
    RequestDescriptor {
        url: absolute_url(req),
        resource_type: resource_type(req),
        headers,
    }
}

fn cancelled_response() -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = StatusCode::FORBIDDEN;
    res
}

#[async_trait::async_trait]
impl HttpHandler for CatchHandler {
    async fn handle_request(&mut self, _ctx: &HttpContext, req: Request<Body>) -> RequestOrResponse {
        if req.method() != Method::GET {
            return RequestOrResponse::Request(req);
        }

        if is_top_level_navigation(&req) {
            let event = NavigationEvent::to(absolute_url(&req));
            if let Err(e) = self.catcher.navigate(event).await {
                debug!("Navigation not delivered: {}", e);
            }
            return RequestOrResponse::Request(req);
        }

        let descriptor = describe(&req);
        if !descriptor.resource_type.is_subscribed() {
            return RequestOrResponse::Request(req);
        }

        let req_id = Uuid::new_v4();
        debug!("Request [{}] {} {}", req_id, descriptor.resource_type, descriptor.url);

        match self.catcher.intercept(descriptor).await {
            Decision::Allow => RequestOrResponse::Request(req),
            Decision::Cancel => {
                info!("Request [{}] cancelled {}", req_id, req.uri());
                RequestOrResponse::Response(cancelled_response())
            }
        }
    }

    async fn handle_response(&mut self, _ctx: &HttpContext, res: Response<Body>) -> Response<Body> {
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> hudsucker::hyper::http::request::Builder {
        Request::builder().method(Method::GET).uri(uri)
    }

    #[test]
    fn test_absolute_url_from_proxy_form() {
        let req = request("https://cdn.example/v.mp4?x=1").body(Body::empty()).unwrap();
        assert_eq!(absolute_url(&req), "https://cdn.example/v.mp4?x=1");
    }

    #[test]
    fn test_absolute_url_from_origin_form() {
        let req = request("/v.m3u8")
            .header("host", "cdn.example")
            .body(Body::empty())
            .unwrap();
        assert_eq!(absolute_url(&req), "https://cdn.example/v.m3u8");
    }

    #[test]
    fn test_absolute_url_drops_default_ports() {
        let tunnelled = request("https://cdn.example:443/v/clip.mp4?t=1").body(Body::empty()).unwrap();
        assert_eq!(absolute_url(&tunnelled), "https://cdn.example/v/clip.mp4?t=1");

        let plain = request("http://cdn.example:80/v/clip.mp4").body(Body::empty()).unwrap();
        assert_eq!(absolute_url(&plain), "http://cdn.example/v/clip.mp4");

        let origin_form = request("/v.m3u8")
            .header("host", "cdn.example:443")
            .body(Body::empty())
            .unwrap();
        assert_eq!(absolute_url(&origin_form), "https://cdn.example/v.m3u8");
    }

    #[test]
    fn test_absolute_url_keeps_other_ports() {
        let req = request("https://cdn.example:8443/v.mp4").body(Body::empty()).unwrap();
        assert_eq!(absolute_url(&req), "https://cdn.example:8443/v.mp4");

        let swapped = request("http://cdn.example:443/v.mp4").body(Body::empty()).unwrap();
        assert_eq!(absolute_url(&swapped), "http://cdn.example:443/v.mp4");
    }

    #[test]
    fn test_describe_without_fetch_metadata() {
        let ranged = request("http://plain.example/stream")
            .header("range", "bytes=0-")
            .body(Body::empty())
            .unwrap();
        assert_eq!(describe(&ranged).resource_type, ResourceType::Media);

        let clip = request("http://plain.example/v/clip.webm").body(Body::empty()).unwrap();
        assert_eq!(describe(&clip).resource_type, ResourceType::Media);

        let api = request("http://plain.example/api/list").body(Body::empty()).unwrap();
        let descriptor = describe(&api);
        assert_eq!(descriptor.resource_type, ResourceType::XmlHttpRequest);
        assert!(descriptor.resource_type.is_subscribed());
    }

    #[test]
    fn test_describe_maps_fetch_metadata() {
        let req = request("https://cdn.example/v.mp4")
            .header("sec-fetch-dest", "video")
            .header("range", "bytes=0-")
            .body(Body::empty())
            .unwrap();
        let descriptor = describe(&req);
        assert_eq!(descriptor.resource_type, ResourceType::Media);
        assert!(descriptor
            .headers
            .contains(&("range".to_string(), "bytes=0-".to_string())));
    }

    #[test]
    fn test_navigation_detection() {
        let req = request("https://newsite.example/")
            .header("sec-fetch-mode", "navigate")
            .header("sec-fetch-dest", "document")
            .body(Body::empty())
            .unwrap();
        assert!(is_top_level_navigation(&req));

        let frame = request("https://ads.example/")
            .header("sec-fetch-mode", "navigate")
            .header("sec-fetch-dest", "iframe")
            .body(Body::empty())
            .unwrap();
        assert!(!is_top_level_navigation(&frame));
    }
}

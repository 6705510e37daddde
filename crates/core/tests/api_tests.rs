//! Library API integration tests
use std::sync::Arc;

use gleaner_core::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

struct Route {
    path: &'static str,
    status: u16,
    content_type: &'static str,
    location: Option<String>,
    body: Vec<u8>,
}

impl Route {
    fn ok(path: &'static str, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self { path, status: 200, content_type, location: None, body: body.into() }
    }

    fn status(path: &'static str, status: u16) -> Self {
        Self { path, status, content_type: "text/plain", location: None, body: b"error".to_vec() }
    }

    fn redirect(path: &'static str, location: String) -> Self {
        Self { path, status: 302, content_type: "text/plain", location: Some(location), body: Vec::new() }
    }
}

/// Serves fixed responses on a loopback port and returns its base URL.
async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let path = path.split('?').next().unwrap_or(path);

                let (status, content_type, location, body) = match routes.iter().find(|r| r.path == path) {
                    Some(route) => (route.status, route.content_type, route.location.clone(), route.body.clone()),
                    None => (404, "text/plain", None, b"not found".to_vec()),
                };
                let location = location.map(|l| format!("Location: {l}\r\n")).unwrap_or_default();
                let head = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\n{location}Content-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).to_string()
}

/// Accepts connections and holds them open without ever answering.
async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

/// `/r0` redirects through `/r1` .. `/r{hops}`, which serves a page.
fn redirect_chain(hops: usize) -> Vec<Route> {
    const PATHS: [&str; 8] = ["/r0", "/r1", "/r2", "/r3", "/r4", "/r5", "/r6", "/r7"];
    let mut routes: Vec<Route> = (0..hops).map(|i| Route::redirect(PATHS[i], PATHS[i + 1].to_string())).collect();
    routes.push(Route::ok(PATHS[hops], "text/html", "<html><body><p>landed</p></body></html>"));
    routes
}

fn pipeline() -> PagePipeline {
    PagePipeline::from_config(FetchConfig { timeout: 5, ..FetchConfig::default() }, ExtractConfig::default()).unwrap()
}

fn gbk_article() -> Vec<u8> {
    let paragraphs: String = [
        "今年春季長江中游的降雨比往年更加充沛，航道水位因此明顯回升，大型貨船得以恢復正常班期。",
        "武漢港口的集裝箱吞吐量在五月初創下同期新高，港口管理部門表示裝卸效率也有所提升。",
        "貨運代理公司反映訂艙等待時間從三週縮短到十天以內，出口企業的壓力得到緩解。",
        "分析人士提醒夏季汛期可能再次影響通航，多家承運人正在重新評估駁船的保險安排。",
        "省級部門宣佈追加疏浚合同，力求在颱風季節到來之前穩定宜昌附近的航道條件。",
        "物流企業同時介紹了連接內陸場站與沿江碼頭的新鐵路線路，多式聯運成本明顯下降。",
    ]
    .iter()
    .map(|p| format!("<p>{p}</p>"))
    .collect();

    let html = format!(
        r#"<html><head><meta charset="gb2312"><title>長江航運</title></head><body><article>{paragraphs}</article></body></html>"#
    );
    let (bytes, _, had_errors) = encoding_rs::GBK.encode(&html);
    assert!(!had_errors);
    bytes.into_owned()
}

#[test]
fn test_extract_news_fixture() {
    let html = read_fixture("news_article.html");
    let outcome = pipeline().extract_html(&html, "https://news.example.com/news/2024/05/01/yangtze.html");

    assert!(outcome.success);
    assert_eq!(outcome.title, "长江航运在五月初显著复苏，港口吞吐量创下新高");
    assert_eq!(outcome.publish_date.as_deref(), Some("2024-05-01T08:30:00+08:00"));
    assert!(outcome.content.starts_with("Shipping along the Yangtze"));
    assert_eq!(outcome.content.split("\n\n").count(), 6);
    assert!(!outcome.content.contains("读者评论"));
    assert!(!outcome.content.contains("版权所有"));
    assert!(outcome.quality.unwrap().is_acceptable());
}

#[test]
fn test_list_fixture_detected() {
    let html = read_fixture("list_page.html");
    let base = url::Url::parse("https://news.example.com/world/").unwrap();
    let doc = Document::parse_cleaned(&html, Some(base));

    assert!(is_list_page(&doc));
    assert_eq!(
        find_article_link(&doc).unwrap().as_str(),
        "https://news.example.com/world/2024/05/01/yangtze-shipping.html"
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let html = read_fixture("news_article.html");
    let pipeline = pipeline();
    let url = "https://news.example.com/news/2024/05/01/yangtze.html";

    assert_eq!(pipeline.extract_html(&html, url), pipeline.extract_html(&html, url));
}

#[tokio::test]
async fn test_pipeline_follows_list_page() {
    let base = serve(vec![
        Route::ok("/world/", "text/html; charset=utf-8", read_fixture("list_page.html")),
        Route::ok(
            "/world/2024/05/01/yangtze-shipping.html",
            "text/html; charset=utf-8",
            read_fixture("news_article.html"),
        ),
    ])
    .await;

    let outcome = pipeline().fetch_and_extract(&format!("{base}/world/")).await;

    assert!(outcome.success, "{}", outcome.content);
    assert!(outcome.url.ends_with("/world/2024/05/01/yangtze-shipping.html"));
    assert!(outcome.content.contains("Yangtze"));
}

#[tokio::test]
async fn test_pipeline_keeps_list_page_when_follow_fails() {
    let base = serve(vec![Route::ok("/world/", "text/html", read_fixture("list_page.html"))]).await;
    let url = format!("{base}/world/");

    let outcome = pipeline().fetch_and_extract(&url).await;

    assert_eq!(outcome.url, url);
    assert_eq!(outcome.title, "国际新闻 - 示例新闻网");
    assert!(outcome.quality.is_some());
}

#[tokio::test]
async fn test_pipeline_decodes_gbk() {
    let base = serve(vec![Route::ok("/news/gbk.html", "text/html; charset=gbk", gbk_article())]).await;

    let outcome = pipeline().fetch_and_extract(&format!("{base}/news/gbk.html")).await;

    assert!(outcome.success, "{}", outcome.content);
    assert_eq!(outcome.title, "長江航運");
    assert!(outcome.content.contains("武漢港口的集裝箱吞吐量"));
}

#[tokio::test]
async fn test_pipeline_meta_charset_without_header() {
    let base = serve(vec![Route::ok("/news/gbk.html", "text/html", gbk_article())]).await;

    let outcome = pipeline().fetch_and_extract(&format!("{base}/news/gbk.html")).await;
    assert!(outcome.content.contains("武漢港口"));
}

#[tokio::test]
async fn test_pipeline_http_error() {
    let base = serve(vec![Route::status("/broken", 500)]).await;

    let outcome = pipeline().fetch_and_extract(&format!("{base}/broken")).await;

    assert!(!outcome.success);
    assert_eq!(outcome.title, "无法访问此链接");
    assert!(outcome.content.contains("HTTP 500"));
}

#[tokio::test]
async fn test_fetcher_follows_up_to_five_redirects() {
    let base = serve(redirect_chain(5)).await;
    let fetcher = PageFetcher::new(FetchConfig { timeout: 5, ..FetchConfig::default() }).unwrap();

    let page = fetcher.fetch(&format!("{base}/r0")).await.unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.url.path(), "/r5");
    assert!(String::from_utf8_lossy(&page.bytes).contains("landed"));
}

#[tokio::test]
async fn test_fetcher_rejects_sixth_redirect() {
    let base = serve(redirect_chain(6)).await;
    let fetcher = PageFetcher::new(FetchConfig { timeout: 5, ..FetchConfig::default() }).unwrap();

    let err = fetcher.fetch(&format!("{base}/r0")).await.unwrap_err();

    match err {
        GleanerError::HttpError(e) => assert!(e.is_redirect()),
        other => panic!("expected a redirect error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetcher_timeout() {
    let base = serve_silent().await;
    let fetcher = PageFetcher::new(FetchConfig { timeout: 1, ..FetchConfig::default() }).unwrap();

    let err = fetcher.fetch(&format!("{base}/slow")).await.unwrap_err();

    assert!(matches!(err, GleanerError::Timeout { timeout: 1 }));
    assert_eq!(err.to_string(), "Request timed out after 1 seconds");

    let pipeline =
        PagePipeline::from_config(FetchConfig { timeout: 1, ..FetchConfig::default() }, ExtractConfig::default())
            .unwrap();
    let outcome = pipeline.fetch_and_extract(&format!("{base}/slow")).await;
    assert!(!outcome.success);
    assert!(outcome.content.contains("timed out"));
}

#[tokio::test]
async fn test_service_enriches_from_provider() {
    let article = read_fixture("news_article.html");
    let base = serve(vec![Route::ok("/news/2024/05/01/yangtze.html", "text/html; charset=utf-8", article)]).await;

    let serper_body = format!(
        r#"{{"organic": [
            {{"title": "Yangtze shipping", "link": "{base}/news/2024/05/01/yangtze.html", "snippet": "Shipping recovered."}},
            {{"title": "Missing page", "link": "{base}/news/gone.html", "snippet": "Gone."}}
        ]}}"#
    );
    let provider_base = serve(vec![Route::ok("/search", "application/json", serper_body)]).await;

    let config = GleanerConfig::builder()
        .serper_api_key("test-key")
        .serper_endpoint(format!("{provider_base}/search"))
        .fetch_timeout(5)
        .build();
    let service = SearchService::from_config(&config).unwrap();

    let response = service.perform_search("长江航运", None, true).await;

    assert_eq!(response.meta.total_results, 2);
    let first = &response.results[0];
    assert!(first.full_content);
    assert!(first.content.starts_with("Shipping along the Yangtze"));
    assert_eq!(first.date.as_deref(), Some("2024-05-01T08:30:00+08:00"));

    let second = &response.results[1];
    assert!(!second.full_content);
    assert_eq!(second.content, "Gone.");
}

#[tokio::test]
async fn test_service_falls_back_to_serpapi() {
    let serpapi_body = r#"{"news_results": [
        {"title": "River news", "link": "https://news.example.com/1", "snippet": "Snippet",
         "source": {"name": "Example Daily"}, "date": "1 day ago"}
    ]}"#;
    let base = serve(vec![Route::status("/serper", 401), Route::ok("/serpapi", "application/json", serpapi_body)]).await;

    let config = GleanerConfig::builder()
        .serper_api_key("bad-key")
        .serper_endpoint(format!("{base}/serper"))
        .serpapi_api_key("good-key")
        .serpapi_endpoint(format!("{base}/serpapi"))
        .build();
    let service = SearchService::from_config(&config).unwrap();

    let response = service.perform_search("river", None, false).await;

    assert_eq!(response.results.len(), 1);
    assert!(response.meta.is_news_search);
    assert_eq!(response.results[0].source.as_deref(), Some("Example Daily"));
}

#[tokio::test]
async fn test_service_explicit_engine_without_key_yields_placeholder() {
    let service = SearchService::from_config(&GleanerConfig::default()).unwrap();

    let response = service.perform_search("rust", Some(ProviderKind::Serper), true).await;

    assert_eq!(response.results, vec![placeholder_result("rust")]);
    assert_eq!(response.results[0].url, "https://www.google.com/search?q=rust");
}

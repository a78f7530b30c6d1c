//! End-to-end tests: client → filter host → mock upstream.

use std::time::Duration;

use cookie::Cookie;
use reqwest::header::SET_COOKIE;

use cookie_path_rewrite::config::parse_config;

mod common;

const SCENARIO_COOKIES: &[&str] = &[
    "test=Jk3vQpLmZx; Path=/old",
    "test2=aBcDeFgHiJ; Path=/old; HttpOnly; Max-Age=60",
    "test3=QwErTyUiOp; Path=/old/",
];

fn cookies(response: &reqwest::Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| Cookie::parse(v.to_str().unwrap().to_string()).unwrap())
        .collect()
}

fn name_value_path(cookies: &[Cookie<'_>]) -> Vec<(String, String, Option<String>)> {
    cookies
        .iter()
        .map(|c| {
            (
                c.name().to_string(),
                c.value().to_string(),
                c.path().map(str::to_string),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_simple_replacement_end_to_end() {
    let backend = common::start_cookie_backend(SCENARIO_COOKIES).await;
    let proxy = common::start_proxy(
        backend,
        "[[cookie_path.replacements]]\noriginal = \"/old\"\nreplacement = \"/new\"\n",
    )
    .await;

    let res = common::client()
        .get(format!("http://{}/some/page", proxy.addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-backend").unwrap(), "mock");
    let received = cookies(&res);
    assert_eq!(
        name_value_path(&received),
        vec![
            ("test".into(), "Jk3vQpLmZx".into(), Some("/new".into())),
            ("test2".into(), "aBcDeFgHiJ".into(), Some("/new".into())),
            ("test3".into(), "QwErTyUiOp".into(), Some("/old/".into())),
        ]
    );
    assert_eq!(received[1].http_only(), Some(true));
    assert_eq!(
        received[1].max_age(),
        Some(cookie::time::Duration::seconds(60))
    );
    assert_eq!(res.text().await.unwrap(), "backend body");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_no_rules_passes_cookies_through() {
    let backend = common::start_cookie_backend(SCENARIO_COOKIES).await;
    let proxy = common::start_proxy(backend, "").await;

    let res = common::client()
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(
        name_value_path(&cookies(&res)),
        vec![
            ("test".into(), "Jk3vQpLmZx".into(), Some("/old".into())),
            ("test2".into(), "aBcDeFgHiJ".into(), Some("/old".into())),
            ("test3".into(), "QwErTyUiOp".into(), Some("/old/".into())),
        ]
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_named_capture_and_name_filter_end_to_end() {
    let backend = common::start_cookie_backend(SCENARIO_COOKIES).await;
    let proxy = common::start_proxy(
        backend,
        r#"
[[cookie_path.replacements]]
name_regex = "test"
original = "/(?P<name>[^/]+)"
replacement = "/new/{{name}}"
"#,
    )
    .await;

    let res = common::client()
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .expect("Proxy unreachable");

    let paths: Vec<_> = cookies(&res)
        .iter()
        .map(|c| c.path().map(str::to_string))
        .collect();
    assert_eq!(
        paths,
        vec![
            Some("/new/old".to_string()),
            Some("/old".to_string()),
            Some("/old/".to_string()),
        ]
    );

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_reloaded_rules_take_effect() {
    let backend = common::start_cookie_backend(SCENARIO_COOKIES).await;
    let proxy = common::start_proxy(backend, "").await;
    let client = common::client();

    let before = client
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(cookies(&before)[0].path(), Some("/old"));

    let reloaded = parse_config(&format!(
        "[upstream]\naddress = \"{}\"\n[[cookie_path.replacements]]\noriginal = \"/old/?\"\nreplacement = \"/moved\"\n",
        backend
    ))
    .unwrap();
    proxy.updates.send(reloaded).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let after = client
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .unwrap();
    let paths: Vec<_> = cookies(&after)
        .iter()
        .map(|c| c.path().map(str::to_string))
        .collect();
    assert_eq!(paths, vec![Some("/moved".to_string()); 3]);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port with nothing listening.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap();
    drop(unused);

    let proxy = common::start_proxy(dead_addr, "").await;

    let res = common::client()
        .get(format!("http://{}/", proxy.addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 502);
    assert!(res.headers().get(SET_COOKIE).is_none());

    proxy.shutdown.trigger();
}

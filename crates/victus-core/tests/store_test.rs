#![allow(clippy::unwrap_used, clippy::expect_used)]
// Integration tests for `CatalogStore` and `DwellingFeed`.
//
// REST endpoints are wiremock fixtures. Event streams come from a small
// in-process server that keeps connections open and lets a test push
// frames, drop connections, or refuse new ones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use victus_api::ReconnectConfig;
use victus_core::{
    CatalogConfig, CatalogKind, CatalogSnapshot, CatalogStore, CoreError, DepartmentRequest,
    DwellingFeed, DwellingRequest, DwellingStatus, DwellingType, SyncState,
};

// ── Event-stream test server ────────────────────────────────────────

#[derive(Debug, Clone)]
enum Push {
    Frame { path: String, frame: String },
    Close { path: String },
}

struct SseServer {
    base: String,
    tx: broadcast::Sender<Push>,
    connected: Arc<Mutex<HashMap<String, usize>>>,
    refuse: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SseServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, _) = broadcast::channel(64);
        let connected = Arc::new(Mutex::new(HashMap::new()));
        let refuse = Arc::new(AtomicBool::new(false));

        let task = {
            let tx = tx.clone();
            let connected = Arc::clone(&connected);
            let refuse = Arc::clone(&refuse);
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    tokio::spawn(serve(
                        socket,
                        tx.subscribe(),
                        Arc::clone(&connected),
                        Arc::clone(&refuse),
                    ));
                }
            })
        };

        Self {
            base,
            tx,
            connected,
            refuse,
            task,
        }
    }

    fn push(&self, path: &str, event: &str, data: &Value) {
        let frame = format!("event: {event}\ndata: {data}\n\n");
        let _ = self.tx.send(Push::Frame {
            path: path.into(),
            frame,
        });
    }

    fn close(&self, path: &str) {
        let _ = self.tx.send(Push::Close { path: path.into() });
    }

    fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    fn connections(&self, path: &str) -> usize {
        self.connected.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    async fn wait_connected(&self, path: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.connections(path) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("no stream connection on {path}"));
    }
}

impl Drop for SseServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut socket: TcpStream,
    mut rx: broadcast::Receiver<Push>,
    connected: Arc<Mutex<HashMap<String, usize>>>,
    refuse: Arc<AtomicBool>,
) {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head);
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_owned();

    if refuse.load(Ordering::SeqCst) {
        let _ = socket
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await;
        return;
    }
    let opened = socket
        .write_all(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncache-control: no-cache\r\nconnection: close\r\n\r\n: open\n\n",
        )
        .await;
    if opened.is_err() {
        return;
    }

    *connected.lock().unwrap().entry(path.clone()).or_default() += 1;
    loop {
        match rx.recv().await {
            Ok(Push::Frame { path: p, frame }) if p == path => {
                if socket.write_all(frame.as_bytes()).await.is_err() {
                    break;
                }
            }
            Ok(Push::Close { path: p }) if p == path => break,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    if let Some(count) = connected.lock().unwrap().get_mut(&path) {
        *count = count.saturating_sub(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const DEPARTMENTS_STREAM: &str = "/departamentos/stream";
const CITIES_STREAM: &str = "/ciudades/stream";
const COMPLEXES_STREAM: &str = "/conjuntos/stream";
const ADMINISTRATORS_STREAM: &str = "/administradores/stream";

fn config(api_url: &str, stream_url: &str) -> CatalogConfig {
    CatalogConfig {
        api_url: api_url.into(),
        stream_url: Some(stream_url.into()),
        timeout: Duration::from_secs(5),
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            max_retries: None,
        },
        retry_interval: Duration::from_secs(30),
        ..CatalogConfig::default()
    }
}

fn departments_body() -> Value {
    json!({ "data": [
        { "id": "D1", "nombre": "Antioquia" },
        { "id": "D2", "nombre": "Caldas" }
    ]})
}

fn cities_body() -> Value {
    json!({ "content": [
        { "id": "C1", "nombre": "Medellín", "departamentoId": "D1" },
        { "ciudadId": 2, "nombre": "Manizales", "departamento": { "id": "D2" } }
    ]})
}

fn complexes_body() -> Value {
    json!([
        {
            "id": "X1",
            "nombre": "Torres del Río",
            "direccion": "Cra 1 # 2-3",
            "telefono": "6041234567",
            "departamentoId": "D1",
            "ciudadId": "C1",
            "administradorId": "A1"
        },
        {
            "conjuntoId": "X2",
            "name": "Altos de Chipre",
            "departamento_id": "D2",
            "ciudad": { "id": "2" },
            "adminId": "A9",
            "administradorNombre": "Luis Mora"
        }
    ])
}

fn administrators_body() -> Value {
    json!({ "items": [
        { "id": "A1", "primerNombre": "Ana", "primerApellido": "Ruiz", "email": "ana@victus.co" }
    ]})
}

async fn mount_catalogs(server: &MockServer) {
    for (route, body) in [
        ("/departamentos", departments_body()),
        ("/ciudades", cities_body()),
        ("/conjuntos", complexes_body()),
        ("/administradores", administrators_body()),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

/// Wait until the store publishes a snapshot satisfying `pred`.
async fn wait_for(store: &CatalogStore, pred: impl Fn(&CatalogSnapshot) -> bool) -> CatalogSnapshot {
    let mut stream = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let latest = stream.latest();
            if pred(&latest) {
                return latest;
            }
            if stream.changed().await.is_none() {
                panic!("store dropped");
            }
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

async fn started_store(api: &MockServer, sse: &SseServer) -> CatalogStore {
    let store = CatalogStore::new(config(&api.uri(), &sse.base)).unwrap();
    store.start().await.unwrap();
    for stream in [
        DEPARTMENTS_STREAM,
        CITIES_STREAM,
        COMPLEXES_STREAM,
        ADMINISTRATORS_STREAM,
    ] {
        sse.wait_connected(stream).await;
    }
    store
}

// ── Hydration ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_hydrates_normalized_catalogs() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    assert_eq!(store.state(), SyncState::Idle);
    store.refresh().await.unwrap();

    let snap = store.snapshot();
    assert_eq!(snap.state, SyncState::Live);
    assert_eq!(snap.departments.len(), 2);
    assert_eq!(snap.city("2").map(|c| c.department_id.as_str()), Some("D2"));
    assert_eq!(snap.administrator("A1").map(|a| a.name.as_str()), Some("Ana Ruiz"));

    let x1 = snap.complex("X1").unwrap();
    assert_eq!(x1.resolved_department_name.as_deref(), Some("Antioquia"));
    assert_eq!(x1.resolved_city_name.as_deref(), Some("Medellín"));
    assert_eq!(x1.resolved_administrator_name.as_deref(), Some("Ana Ruiz"));

    let x2 = snap.complex("X2").unwrap();
    assert_eq!(x2.name, "Altos de Chipre");
    assert_eq!(x2.resolved_city_name.as_deref(), Some("Manizales"));
    // A9 is not cached; the embedded name survives.
    assert_eq!(x2.resolved_administrator_name.as_deref(), Some("Luis Mora"));
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_request_set() {
    let api = MockServer::start().await;
    for (route, body) in [
        ("/departamentos", departments_body()),
        ("/ciudades", cities_body()),
        ("/conjuntos", complexes_body()),
        ("/administradores", administrators_body()),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&api)
            .await;
    }

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    let (a, b, c) = tokio::join!(store.refresh(), store.refresh(), store.refresh());
    assert_eq!((a, b, c), (Ok(()), Ok(()), Ok(())));
    assert_eq!(store.state(), SyncState::Live);
    // `expect(1)` is verified when `api` drops.
}

#[tokio::test]
async fn test_failed_hydration_degrades_then_refresh_recovers() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/departamentos"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    mount_catalogs(&api).await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    let err = tokio_test::assert_err!(store.refresh().await);
    assert_eq!(err.status(), Some(503));

    let snap = store.snapshot();
    assert_eq!(snap.state, SyncState::Degraded);
    assert!(snap.error());
    assert!(snap.is_empty());

    tokio_test::assert_ok!(store.refresh().await);
    let snap = store.snapshot();
    assert_eq!(snap.state, SyncState::Live);
    assert_eq!(snap.departments.len(), 2);
}

// ── Live events ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_events_merge_into_snapshot() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;
    assert_eq!(store.state(), SyncState::Live);

    sse.push(
        COMPLEXES_STREAM,
        "UPDATED",
        &json!({ "id": "X1", "nombre": "Torres del Río II", "departamentoId": "D1", "ciudadId": "C1", "administradorId": "A1" }),
    );
    let snap = wait_for(&store, |s| {
        s.complex("X1").is_some_and(|x| x.name == "Torres del Río II")
    })
    .await;
    assert_eq!(snap.complexes.len(), 2);

    // A renamed department is re-joined onto its complexes.
    sse.push(DEPARTMENTS_STREAM, "UPDATED", &json!({ "id": "D1", "nombre": "Antioquia (Norte)" }));
    wait_for(&store, |s| {
        s.complex("X1")
            .and_then(|x| x.resolved_department_name.as_deref())
            == Some("Antioquia (Norte)")
    })
    .await;

    // Deleting a department cascades to its cities and complexes.
    sse.push(DEPARTMENTS_STREAM, "DELETED", &json!("D1"));
    let snap = wait_for(&store, |s| s.department("D1").is_none()).await;
    assert!(snap.city("C1").is_none());
    assert!(snap.complex("X1").is_none());
    assert!(snap.complex("X2").is_some());

    store.shutdown();
}

#[tokio::test]
async fn test_malformed_event_does_not_degrade() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;

    let _ = sse.tx.send(Push::Frame {
        path: CITIES_STREAM.into(),
        frame: "data: {not json}\n\n".into(),
    });
    sse.push(CITIES_STREAM, "CREATED", &json!({ "id": "C3", "nombre": "Rionegro", "departamentoId": "D1" }));

    let snap = wait_for(&store, |s| s.city("C3").is_some()).await;
    assert_eq!(snap.state, SyncState::Live);
    store.shutdown();
}

// ── Degraded / recovery ─────────────────────────────────────────────

#[tokio::test]
async fn test_lost_stream_degrades_and_reconnect_recovers() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;

    sse.refuse_connections(true);
    sse.close(CITIES_STREAM);

    let snap = wait_for(&store, |s| s.state == SyncState::Degraded).await;
    assert!(snap.is_empty(), "cache must be discarded when degraded");

    // The departments stream is still connected; its events are dropped
    // while degraded.
    sse.push(DEPARTMENTS_STREAM, "CREATED", &json!({ "id": "D9", "nombre": "Chocó" }));
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snap = store.snapshot();
    assert_eq!(snap.state, SyncState::Degraded);
    assert!(snap.departments.is_empty());

    // The cities stream reconnecting triggers recovery.
    sse.refuse_connections(false);
    let snap = wait_for(&store, |s| s.state == SyncState::Live).await;
    assert_eq!(snap.departments.len(), 2);
    assert!(snap.department("D9").is_none());
    assert_eq!(snap.complexes.len(), 2);

    store.shutdown();
}

#[tokio::test]
async fn test_retry_timer_recovers_without_reconnect() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ciudades"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;

    let store = CatalogStore::new(CatalogConfig {
        retry_interval: Duration::from_millis(50),
        ..config(&api.uri(), &sse.base)
    })
    .unwrap();
    let err = store.start().await.unwrap_err();
    assert!(matches!(err, CoreError::Remote { status: 500, .. }));
    assert_eq!(store.state(), SyncState::Degraded);

    let snap = wait_for(&store, |s| s.state == SyncState::Live).await;
    assert_eq!(snap.cities.len(), 2);
    store.shutdown();
}

async fn department_listings(api: &MockServer) -> usize {
    api.received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/departamentos")
        .count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_reconnects_recover_once() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;
    let before = department_listings(&api).await;

    sse.refuse_connections(true);
    for stream in [
        DEPARTMENTS_STREAM,
        CITIES_STREAM,
        COMPLEXES_STREAM,
        ADMINISTRATORS_STREAM,
    ] {
        sse.close(stream);
    }
    wait_for(&store, |s| s.state == SyncState::Degraded).await;

    // All four streams come back at once; only one recovery may run.
    sse.refuse_connections(false);
    wait_for(&store, |s| s.state == SyncState::Live).await;
    for stream in [
        DEPARTMENTS_STREAM,
        CITIES_STREAM,
        COMPLEXES_STREAM,
        ADMINISTRATORS_STREAM,
    ] {
        sse.wait_connected(stream).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.state(), SyncState::Live);
    assert_eq!(department_listings(&api).await, before + 1);
    store.shutdown();
}

#[tokio::test]
async fn test_stream_lost_during_recovery_stays_degraded() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;

    sse.refuse_connections(true);
    sse.close(CITIES_STREAM);
    wait_for(&store, |s| s.state == SyncState::Degraded).await;

    // Slow down the recovery listing so a stream can drop mid-flight.
    Mock::given(method("GET"))
        .and(path("/departamentos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(departments_body())
                .set_delay(Duration::from_millis(400)),
        )
        .with_priority(1)
        .up_to_n_times(1)
        .mount(&api)
        .await;

    sse.refuse_connections(false);
    wait_for(&store, |s| s.state == SyncState::Recovering).await;
    sse.close(COMPLEXES_STREAM);

    // The listing succeeds but missed the complexes stream's gap.
    let snap = wait_for(&store, |s| s.state == SyncState::Degraded).await;
    assert!(snap.is_empty());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.state(), SyncState::Degraded);

    store.shutdown();
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_optimistic_create_merges_immediately() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    Mock::given(method("POST"))
        .and(path("/departamentos"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "D3", "nombre": "Quindío" } })),
        )
        .mount(&api)
        .await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    store.refresh().await.unwrap();

    let created = store
        .create(
            CatalogKind::Department,
            &DepartmentRequest {
                nombre: "Quindío".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name(), "Quindío");
    assert_eq!(store.snapshot().department("D3").map(|d| d.name.as_str()), Some("Quindío"));
}

#[tokio::test]
async fn test_delete_city_cascades_locally() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    Mock::given(method("DELETE"))
        .and(path("/ciudades/C1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&api)
        .await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    store.refresh().await.unwrap();
    store.delete(CatalogKind::City, "C1").await.unwrap();

    let snap = store.snapshot();
    assert!(snap.city("C1").is_none());
    assert!(snap.complex("X1").is_none());
    assert_eq!(snap.departments.len(), 2);
}

#[tokio::test]
async fn test_update_with_empty_body_echoes_payload() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    Mock::given(method("PUT"))
        .and(path("/departamentos/D2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&api)
        .await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    store.refresh().await.unwrap();
    let updated = store
        .update(
            CatalogKind::Department,
            "D2",
            &DepartmentRequest {
                nombre: "Caldas Sur".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name(), "Caldas Sur");
    assert_eq!(store.snapshot().department("D2").map(|d| d.name.as_str()), Some("Caldas Sur"));
}

#[tokio::test]
async fn test_mutation_error_propagates_without_touching_cache() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    Mock::given(method("POST"))
        .and(path("/departamentos"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "DEPARTAMENTO_DUPLICADO",
            "message": "Department already exists"
        })))
        .mount(&api)
        .await;

    let store = CatalogStore::new(config(&api.uri(), &api.uri())).unwrap();
    store.refresh().await.unwrap();
    let before = store.snapshot();

    let err = store
        .create(
            CatalogKind::Department,
            &DepartmentRequest {
                nombre: "Caldas".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.api_error_code(), Some("DEPARTAMENTO_DUPLICADO"));
    assert_eq!(
        victus_core::user_message(&err),
        "Ya existe un departamento con ese nombre."
    );
    assert_eq!(store.snapshot(), before);
}

// ── Shutdown ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_shutdown_closes_streams() {
    let api = MockServer::start().await;
    mount_catalogs(&api).await;
    let sse = SseServer::start().await;
    let store = started_store(&api, &sse).await;

    store.shutdown();
    assert_eq!(store.state(), SyncState::Idle);
    assert_eq!(store.refresh().await, Err(CoreError::Shutdown));

    tokio::time::timeout(Duration::from_secs(5), async {
        while sse.connections(DEPARTMENTS_STREAM) > 0 {
            // A push makes the server notice the closed socket.
            sse.push(DEPARTMENTS_STREAM, "CREATED", &json!({ "id": "D7" }));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("stream still open after shutdown");
}

// ── Dwelling feed ───────────────────────────────────────────────────

#[tokio::test]
async fn test_dwelling_feed_lists_and_follows_events() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conjuntos/X1/viviendas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "V1", "numero": "101", "tipo": "Apartamento", "estado": "Disponible" },
            { "id": "V2", "propertyNumber": "102", "propertyType": "HOUSE", "status": "occupied" }
        ])))
        .mount(&api)
        .await;
    Mock::given(method("PUT"))
        .and(path("/viviendas/V1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "V1", "numero": "101", "tipo": "Dúplex", "estado": "Mantenimiento", "conjuntoId": "X1"
        })))
        .mount(&api)
        .await;
    let sse = SseServer::start().await;

    let store = CatalogStore::new(config(&api.uri(), &sse.base)).unwrap();
    let feed = DwellingFeed::open(&store, "X1").await.unwrap();
    let snap = feed.snapshot();
    assert_eq!(snap.dwellings.len(), 2);
    assert_eq!(snap.dwellings[1].dwelling_type, DwellingType::House);
    assert_eq!(snap.dwellings[1].status, DwellingStatus::Occupied);
    assert!(snap.dwellings.iter().all(|d| d.complex_id == "X1"));

    let stream_path = "/conjuntos/X1/viviendas/stream";
    sse.wait_connected(stream_path).await;
    sse.push(stream_path, "CREATED", &json!({ "id": "V3", "numero": "201", "tipo": "Casa" }));

    let mut changes = feed.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while changes.latest().dwellings.len() < 3 {
            changes.changed().await;
        }
    })
    .await
    .expect("created dwelling never arrived");
    assert_eq!(feed.search("casa").len(), 2);

    let updated = feed
        .update(
            "V1",
            &DwellingRequest {
                numero: "101".into(),
                tipo: DwellingType::Duplex,
                estado: DwellingStatus::Maintenance,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, DwellingStatus::Maintenance);
    assert_eq!(feed.search("mantenimiento").len(), 1);
}

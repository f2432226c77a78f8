//! Runs the client against an in-process axum server that answers like the real backend.

use api_client::{ApiClient, ApiError, DownloadState};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use inder_core::{ClientConfig, Session};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const CEDULA: &str = "1098765432";
const TOKEN: &str = "tok-123";

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(root: &str, token: Option<&str>) -> ApiClient {
    let temp = tempfile::TempDir::new().unwrap();
    let config = ClientConfig::new(
        format!("{root}/api/v1"),
        Duration::from_secs(5),
        temp.path().join("session.json"),
        temp.path().to_path_buf(),
        "http://localhost:5173".into(),
    )
    .unwrap();
    let mut session = Session::empty(temp.path().join("session.json"));
    if let Some(token) = token {
        session.sign_in(token.into(), None).unwrap();
    }
    ApiClient::new(&config, &session).unwrap()
}

fn deportista(n: usize) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "tipo_documento_id": Uuid::new_v4(),
        "numero_documento": format!("10{n}"),
        "nombres": format!("Atleta {n}"),
        "apellidos": "Pérez",
        "fecha_nacimiento": "2001-05-14",
        "sexo_id": Uuid::new_v4(),
        "estado_id": Uuid::new_v4(),
        "created_at": "2025-01-10T14:03:00.123456",
        "foto": null
    })
}

#[tokio::test]
async fn test_health_is_served_at_root() {
    let app = Router::new().route(
        "/health",
        get(|| async { Json(json!({"status": "ok", "app": "INDER", "environment": "test"})) }),
    );
    let client = client_for(&serve(app).await, None);

    let health = client.health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.app.as_deref(), Some("INDER"));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let app = Router::new().route(
        "/api/v1/historias_clinicas/",
        get(|headers: HeaderMap| async move {
            match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                Some("Bearer secreto") => (StatusCode::OK, Json(json!([]))),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Not authenticated"})),
                ),
            }
        }),
    );
    let root = serve(app).await;

    let anonymous = client_for(&root, None);
    match anonymous.historias().list().await {
        Err(ApiError::Unauthorized { detail }) => assert_eq!(detail, "Not authenticated"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }

    let signed_in = client_for(&root, Some("secreto"));
    assert!(signed_in.historias().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_athlete_list_is_paginated_client_side() {
    let app = Router::new().route(
        "/api/v1/deportistas",
        get(|| async { Json(Value::Array((1..=5).map(deportista).collect())) }),
    );
    let client = client_for(&serve(app).await, None);

    let page = client.deportistas().list(2, 2).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].nombres, "Atleta 3");
}

#[tokio::test]
async fn test_short_search_never_reaches_server() {
    let hits = Arc::new(Mutex::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/api/v1/deportistas/search",
        get(move || {
            let counter = counter.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Json(json!([]))
            }
        }),
    );
    let client = client_for(&serve(app).await, None);

    let err = client.deportistas().search(" a ").await.expect_err("too short");
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(*hits.lock().unwrap(), 0);

    client.deportistas().search("an").await.unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_validation_errors_are_flattened() {
    let app = Router::new().route(
        "/api/v1/deportistas/search",
        get(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": [
                    {"loc": ["query", "q"], "msg": "field required", "type": "missing"}
                ]})),
            )
        }),
    );
    let client = client_for(&serve(app).await, None);

    match client.deportistas().search("ana").await {
        Err(ApiError::Status { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail, "query.q: field required");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_reports_path() {
    let app = Router::new().route(
        "/api/v1/citas/:id",
        get(|Path(id): Path<Uuid>| async move {
            Json(json!({
                "id": id,
                "deportista_id": Uuid::new_v4(),
                "fecha": "mañana",
                "hora": "09:30:00",
                "tipo_cita_id": Uuid::new_v4(),
                "estado_cita_id": Uuid::new_v4()
            }))
        }),
    );
    let client = client_for(&serve(app).await, None);

    match client.citas().get(Uuid::new_v4()).await {
        Err(ApiError::Decode { path, .. }) => assert_eq!(path, "fecha"),
        other => panic!("expected Decode, got {other:?}"),
    }
}

fn catalog_items(nombre: &str) -> Value {
    let names: &[&str] = match nombre {
        "tipo_documento" => &["Cédula de ciudadanía", "Tarjeta de identidad"],
        "sexo" => &["Masculino", "Femenino"],
        "estado_deportista" => &["Activo"],
        "tipo_cita" => &["Control", "Primera vez"],
        "estado_cita" => &["Programada", "Realizada", "Cancelada"],
        _ => &[],
    };
    Value::Array(
        names
            .iter()
            .map(|n| json!({"id": Uuid::new_v4(), "nombre": n, "activo": true}))
            .collect(),
    )
}

#[tokio::test]
async fn test_catalogs_load_once() {
    let app = Router::new().route(
        "/api/v1/catalogos/:nombre/items",
        get(|Path(nombre): Path<String>| async move { Json(catalog_items(&nombre)) }),
    );
    let client = client_for(&serve(app).await, None);

    let catalogos = client.catalogos().load_all().await.unwrap();
    assert_eq!(catalogos.len(), 10);
    let realizada = catalogos.by_nombre("estado_cita", "REALIZADA").unwrap();
    assert_eq!(catalogos.nombre(realizada.id), Some("Realizada"));
}

#[tokio::test]
async fn test_catalog_loading_fails_as_a_whole() {
    let app = Router::new().route(
        "/api/v1/catalogos/:nombre/items",
        get(|Path(nombre): Path<String>| async move {
            if nombre == "sexo" {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Catálogo no encontrado"})),
                )
            } else {
                (StatusCode::OK, Json(catalog_items(&nombre)))
            }
        }),
    );
    let client = client_for(&serve(app).await, None);

    match client.catalogos().load_all().await {
        Err(ApiError::NotFound { detail }) => assert_eq!(detail, "Catálogo no encontrado"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_history_pdf_default_filename() {
    let app = Router::new().route(
        "/api/v1/documentos/:id/historia-clinica-pdf",
        get(|| async { ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.4".to_vec()) }),
    );
    let client = client_for(&serve(app).await, None);
    let id = Uuid::new_v4();

    let download = client.documentos().historia_pdf(id).await.unwrap();
    assert_eq!(download.filename, Some(format!("historia_clinica_{id}.pdf")));
    assert_eq!(download.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(download.bytes, b"%PDF-1.4");
}

#[derive(Default)]
struct TokenState {
    fallidos: u32,
    verificado: bool,
}

type Shared = Arc<Mutex<TokenState>>;

async fn info(State(state): State<Shared>, Path(token): Path<String>) -> Json<Value> {
    let state = state.lock().unwrap();
    if token != TOKEN {
        return Json(json!({"valido": false, "mensaje": "Enlace no válido"}));
    }
    Json(json!({
        "valido": true,
        "intentos_restantes": 3 - state.fallidos,
        "expira_en": "2030-01-01T12:00:00"
    }))
}

async fn verificar(State(state): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut state = state.lock().unwrap();
    if body["token"] != TOKEN {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Enlace no válido o expirado"})),
        );
    }
    if state.fallidos >= 3 {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"detail": "Máximo de intentos alcanzado. Solicite un nuevo enlace."})),
        );
    }
    if body["cedula"] != CEDULA {
        state.fallidos += 1;
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "detail": format!("Cédula incorrecta. Intentos restantes: {}", 3 - state.fallidos)
            })),
        );
    }
    state.verificado = true;
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "mensaje": "Verificación exitosa",
            "historia_clinica_id": Uuid::new_v4()
        })),
    )
}

async fn descargar(State(state): State<Shared>) -> axum::response::Response {
    if !state.lock().unwrap().verificado {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "Debe verificar su cédula primero"})),
        )
            .into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=historia_clinica_1098765432.pdf",
            ),
        ],
        b"%PDF-1.4 historia".to_vec(),
    )
        .into_response()
}

fn descarga_segura_app() -> Router {
    Router::new()
        .route("/api/v1/descarga-segura/info/:token", get(info))
        .route("/api/v1/descarga-segura/verificar", post(verificar))
        .route("/api/v1/descarga-segura/descargar/:token", get(descargar))
        .with_state(Shared::default())
}

#[tokio::test]
async fn test_secure_download_happy_path() {
    let client = client_for(&serve(descarga_segura_app()).await, None);
    let dir = tempfile::TempDir::new().unwrap();
    let mut flow = client.secure_download(TOKEN);

    let state = flow.start().await.unwrap().clone();
    assert!(matches!(
        state,
        DownloadState::Ready {
            intentos_restantes: Some(3),
            expira_en: Some(_)
        }
    ));

    let state = flow.verify("12345").await.unwrap().clone();
    assert!(matches!(
        state,
        DownloadState::Ready {
            intentos_restantes: Some(2),
            ..
        }
    ));
    assert_eq!(
        flow.mensaje(),
        Some("Cédula incorrecta. Intentos restantes: 2")
    );

    // Separators are stripped before sending.
    assert_eq!(
        flow.verify("1.098.765.432").await.unwrap(),
        &DownloadState::Verified
    );

    let state = flow.download(dir.path()).await.unwrap().clone();
    let expected = dir.path().join("historia_clinica_1098765432.pdf");
    assert_eq!(
        state,
        DownloadState::Downloaded {
            path: expected.clone()
        }
    );
    assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-1.4 historia");
}

#[tokio::test]
async fn test_secure_download_blocks_after_server_limit() {
    let client = client_for(&serve(descarga_segura_app()).await, None);
    let mut flow = client.secure_download(TOKEN);
    flow.start().await.unwrap();

    for _ in 0..3 {
        flow.verify("999").await.unwrap();
    }
    assert!(matches!(
        flow.state(),
        DownloadState::Ready {
            intentos_restantes: Some(0),
            ..
        }
    ));

    let state = flow.verify("999").await.unwrap().clone();
    assert!(matches!(state, DownloadState::Blocked { .. }));

    let err = flow.verify(CEDULA).await.expect_err("blocked flows do not verify");
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_secure_download_rejects_before_network() {
    let client = client_for(&serve(descarga_segura_app()).await, None);
    let dir = tempfile::TempDir::new().unwrap();

    let mut unknown = client.secure_download("otro");
    assert!(matches!(
        unknown.start().await.unwrap(),
        DownloadState::Invalid { .. }
    ));

    let mut flow = client.secure_download(TOKEN);
    flow.start().await.unwrap();
    assert!(matches!(
        flow.verify("12-34").await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        flow.download(dir.path()).await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        flow.state(),
        DownloadState::Ready {
            intentos_restantes: Some(3),
            ..
        }
    ));
}

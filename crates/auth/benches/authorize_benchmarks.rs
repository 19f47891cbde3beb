use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::{DateTime, Utc};
use folio_auth::{
    decide_access, AccessEngine, AccessRequest, AccessRequirement, Hs256SessionCodec, HttpMethod,
    IdentityStore, PermissionMatrix, Principal, Resource, Role, RoleName, RoleRecord, UserRecord,
};
use folio_core::{AppResult, RoleId, UserId};
use std::sync::Arc;

const SECRET: &str = "bench-secret";
const MATRIX: &str = r#"{"users":{"GET":true},"pages":{"GET":true,"POST":true,"PATCH":true},"navigationMenu":{"POST":true}}"#;

/// Single-user store returning fixed records (no locking, no IO).
struct StaticStore;

#[async_trait::async_trait]
impl IdentityStore for StaticStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(Some(UserRecord {
            id,
            role_id: RoleId::new(3),
        }))
    }

    async fn find_role_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(Some(RoleRecord {
            id,
            name: "editor".to_string(),
            permissions: MATRIX.to_string(),
        }))
    }
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn bench_decide_access(c: &mut Criterion) {
    let principal = Principal {
        user_id: UserId::new(7),
        role: Role {
            id: RoleId::new(3),
            name: RoleName::Editor,
            permissions: PermissionMatrix::parse(MATRIX).unwrap(),
        },
    };
    let pages = AccessRequirement::new(Resource::PAGES);
    let users_self = AccessRequirement::new(Resource::USERS).consultable_by_self();

    let mut group = c.benchmark_group("decide_access");
    group.bench_function("matrix_grant", |b| {
        b.iter(|| decide_access(black_box(&principal), &pages, Some(HttpMethod::Post), None))
    });
    group.bench_function("self_access", |b| {
        b.iter(|| {
            decide_access(
                black_box(&principal),
                &users_self,
                Some(HttpMethod::Patch),
                Some(UserId::new(7)),
            )
        })
    });
    group.finish();
}

fn bench_full_authorize(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let codec = Hs256SessionCodec::new(SECRET);
    let header = format!("Bearer {}", codec.issue(UserId::new(7), now()).unwrap());
    let engine = AccessEngine::new(Arc::new(codec), Arc::new(StaticStore));
    let requirement = AccessRequirement::new(Resource::PAGES);

    c.bench_function("authorize/token+resolve+decide", |b| {
        b.iter(|| {
            let request = AccessRequest {
                authorization: Some(header.as_str()),
                method: Some(HttpMethod::Post),
                target_owner_id: None,
            };
            runtime.block_on(engine.authorize(black_box(&request), &requirement, now()))
        })
    });
}

criterion_group!(benches, bench_decide_access, bench_full_authorize);
criterion_main!(benches);

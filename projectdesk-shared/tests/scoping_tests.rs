/// Visibility and authorization against a real store
///
/// Run with: cargo test --test scoping_tests

mod common;

use projectdesk_shared::auth::scope::visible_access;
use projectdesk_shared::error::{DomainError, ForbiddenReason, Resource};
use projectdesk_shared::models::membership::{ProjectMembership, ProjectRole};
use projectdesk_shared::service;
use projectdesk_shared::validation::{AddMemberPayload, CommentPayload, ProjectPatch, ProjectPayload};
use uuid::Uuid;

fn add(user_id: Uuid, role: Option<&str>) -> AddMemberPayload {
    AddMemberPayload {
        user_id: Some(user_id),
        role: role.map(str::to_string),
    }
}

#[tokio::test]
async fn test_owner_is_admin_after_creation() {
    let Some(pool) = common::test_pool().await else { return };

    let owner = common::principal(&pool, "owner").await;
    let project = common::create_project(&pool, &owner, "Alpha").await;

    let role = ProjectMembership::role_of(&pool, project.id, owner.user_id)
        .await
        .unwrap();
    assert_eq!(role, Some(ProjectRole::Admin));
    assert_eq!(project.owner_id, owner.user_id);
    assert_eq!(
        ProjectMembership::count_by_project(&pool, project.id).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_failed_owner_seeding_rolls_back_project() {
    let Some(pool) = common::test_pool().await else { return };

    let owner = common::principal(&pool, "owner").await;
    let name = format!("reject_owner_{}", owner.user_id.simple());

    // Rejects only this owner's membership row
    sqlx::query(&format!(
        "CREATE FUNCTION {name}() RETURNS trigger AS $$ \
         BEGIN \
             IF NEW.user_id = '{id}' THEN RAISE EXCEPTION 'owner seeding rejected'; END IF; \
             RETURN NEW; \
         END $$ LANGUAGE plpgsql",
        id = owner.user_id
    ))
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER {name} BEFORE INSERT ON project_memberships \
         FOR EACH ROW EXECUTE FUNCTION {name}()"
    ))
    .execute(&pool)
    .await
    .unwrap();

    let result = service::create_project(
        &pool,
        &owner,
        ProjectPayload {
            name: Some("Doomed".to_string()),
            description: None,
        },
    )
    .await;

    sqlx::query(&format!("DROP TRIGGER {name} ON project_memberships"))
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP FUNCTION {name}()"))
        .execute(&pool)
        .await
        .unwrap();

    assert!(matches!(result, Err(DomainError::Database(_))));

    let (projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE owner_id = $1")
        .bind(owner.user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(projects, 0);
    assert!(service::list_projects(&pool, &owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_projects_is_owner_or_member() {
    let Some(pool) = common::test_pool().await else { return };

    let alice = common::principal(&pool, "alice").await;
    let bob = common::principal(&pool, "bob").await;
    let carol = common::principal(&pool, "carol").await;

    let alpha = common::create_project(&pool, &alice, "Alpha").await;
    let beta = common::create_project(&pool, &bob, "Beta").await;
    common::join(&pool, beta.id, &alice, ProjectRole::Member).await;

    let for_alice = service::list_projects(&pool, &alice).await.unwrap();
    let ids: Vec<Uuid> = for_alice.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![beta.id, alpha.id], "newest first, owned and joined");

    let for_bob = service::list_projects(&pool, &bob).await.unwrap();
    assert_eq!(for_bob.iter().map(|p| p.id).collect::<Vec<_>>(), vec![beta.id]);

    assert!(service::list_projects(&pool, &carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_outsider_sees_empty_listing_and_not_found() {
    let Some(pool) = common::test_pool().await else { return };

    let a = common::principal(&pool, "a").await;
    let b = common::principal(&pool, "b").await;

    let alpha = common::create_project(&pool, &a, "Alpha").await;
    let task = common::create_task(&pool, &a, alpha.id, "Secret").await;

    let scoped = service::list_tasks(&pool, &b, Some(alpha.id)).await.unwrap();
    assert!(scoped.is_empty());

    match service::get_task(&pool, &b, task.id).await {
        Err(DomainError::NotFound(Resource::Task)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }

    match service::get_project(&pool, &b, alpha.id).await {
        Err(DomainError::NotFound(Resource::Project)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }

    assert!(visible_access(&pool, alpha.id, &b).await.unwrap().is_none());
}

#[tokio::test]
async fn test_task_and_comment_visibility_follow_project() {
    let Some(pool) = common::test_pool().await else { return };

    let owner = common::principal(&pool, "owner").await;
    let member = common::principal(&pool, "member").await;
    let outsider = common::principal(&pool, "outsider").await;

    let project = common::create_project(&pool, &owner, "Gamma").await;
    let task = common::create_task(&pool, &owner, project.id, "Plan").await;
    let comment = service::create_comment(
        &pool,
        &owner,
        Some(task.id),
        CommentPayload {
            content: Some("kickoff".to_string()),
            task_id: None,
        },
    )
    .await
    .unwrap();

    // Before joining the member sees nothing
    assert!(service::list_tasks(&pool, &member, None).await.unwrap().is_empty());
    assert!(service::list_comments(&pool, &member, None).await.unwrap().is_empty());

    common::join(&pool, project.id, &member, ProjectRole::Member).await;

    let global = service::list_tasks(&pool, &member, None).await.unwrap();
    let scoped = service::list_tasks(&pool, &member, Some(project.id)).await.unwrap();
    assert_eq!(global, scoped);
    assert_eq!(global.iter().map(|t| t.id).collect::<Vec<_>>(), vec![task.id]);

    let comments = service::list_comments(&pool, &member, Some(task.id)).await.unwrap();
    assert_eq!(comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![comment.id]);
    assert_eq!(
        service::get_comment(&pool, &member, comment.id).await.unwrap().id,
        comment.id
    );

    assert!(service::list_comments(&pool, &outsider, Some(task.id))
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        service::get_comment(&pool, &outsider, comment.id).await,
        Err(DomainError::NotFound(Resource::Comment))
    ));
}

#[tokio::test]
async fn test_add_member_twice_is_duplicate() {
    let Some(pool) = common::test_pool().await else { return };

    let admin = common::principal(&pool, "admin").await;
    let target = common::principal(&pool, "target").await;
    let project = common::create_project(&pool, &admin, "Delta").await;

    let first = service::add_member(&pool, &admin, project.id, add(target.user_id, None))
        .await
        .unwrap();
    assert_eq!(first.role, ProjectRole::Member);

    let second =
        service::add_member(&pool, &admin, project.id, add(target.user_id, Some("Admin"))).await;
    assert!(matches!(second, Err(DomainError::DuplicateMember)));

    // Existing role untouched, still exactly one row for the pair
    assert_eq!(
        ProjectMembership::role_of(&pool, project.id, target.user_id)
            .await
            .unwrap(),
        Some(ProjectRole::Member)
    );
    assert_eq!(
        ProjectMembership::count_by_project(&pool, project.id).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_concurrent_add_member_leaves_one_row() {
    let Some(pool) = common::test_pool().await else { return };

    let admin = common::principal(&pool, "admin").await;
    let target = common::principal(&pool, "target").await;
    let project = common::create_project(&pool, &admin, "Race").await;

    let (left, right) = tokio::join!(
        service::add_member(&pool, &admin, project.id, add(target.user_id, None)),
        service::add_member(&pool, &admin, project.id, add(target.user_id, None)),
    );

    let outcomes = [left, right];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(DomainError::DuplicateMember)))
            .count(),
        1
    );
    assert!(ProjectMembership::is_member(&pool, project.id, target.user_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_add_member_denials_distinguish_reason() {
    let Some(pool) = common::test_pool().await else { return };

    let admin = common::principal(&pool, "admin").await;
    let c = common::principal(&pool, "c").await;
    let d = common::principal(&pool, "d").await;
    let stranger = common::principal(&pool, "stranger").await;
    let project = common::create_project(&pool, &admin, "Epsilon").await;

    service::add_member(&pool, &admin, project.id, add(c.user_id, Some("Member")))
        .await
        .unwrap();

    let by_member = service::add_member(&pool, &c, project.id, add(d.user_id, None)).await;
    let by_stranger = service::add_member(&pool, &stranger, project.id, add(d.user_id, None)).await;

    match (by_member, by_stranger) {
        (
            Err(DomainError::Forbidden(ForbiddenReason::InsufficientRole)),
            Err(DomainError::Forbidden(ForbiddenReason::NotMember)),
        ) => {}
        other => panic!("unexpected outcomes: {:?}", other),
    }

    assert!(!ProjectMembership::is_member(&pool, project.id, d.user_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_add_member_input_failures() {
    let Some(pool) = common::test_pool().await else { return };

    let admin = common::principal(&pool, "admin").await;
    let target = common::principal(&pool, "target").await;
    let project = common::create_project(&pool, &admin, "Zeta").await;

    assert!(matches!(
        service::add_member(&pool, &admin, Uuid::new_v4(), add(target.user_id, None)).await,
        Err(DomainError::NotFound(Resource::Project))
    ));
    assert!(matches!(
        service::add_member(&pool, &admin, project.id, add(target.user_id, Some("Owner"))).await,
        Err(DomainError::InvalidRole(role)) if role == "Owner"
    ));
    assert!(matches!(
        service::add_member(&pool, &admin, project.id, add(Uuid::new_v4(), None)).await,
        Err(DomainError::UserNotFound)
    ));
    assert!(matches!(
        service::add_member(&pool, &admin, project.id, AddMemberPayload::default()).await,
        Err(DomainError::Validation(errors)) if errors.get("user_id").is_some()
    ));
}

#[tokio::test]
async fn test_update_and_delete_project_rights() {
    let Some(pool) = common::test_pool().await else { return };

    let owner = common::principal(&pool, "owner").await;
    let admin = common::principal(&pool, "admin").await;
    let member = common::principal(&pool, "member").await;
    let project = common::create_project(&pool, &owner, "Eta").await;
    common::join(&pool, project.id, &admin, ProjectRole::Admin).await;
    common::join(&pool, project.id, &member, ProjectRole::Member).await;

    let rename = || ProjectPatch {
        name: Some("Eta v2".to_string()),
        description: None,
    };

    assert!(matches!(
        service::update_project(&pool, &member, project.id, rename()).await,
        Err(DomainError::Forbidden(ForbiddenReason::InsufficientRole))
    ));
    let updated = service::update_project(&pool, &admin, project.id, rename())
        .await
        .unwrap();
    assert_eq!(updated.name, "Eta v2");

    assert!(matches!(
        service::delete_project(&pool, &admin, project.id).await,
        Err(DomainError::Forbidden(ForbiddenReason::NotOwner))
    ));
    service::delete_project(&pool, &owner, project.id).await.unwrap();
    assert!(matches!(
        service::get_project(&pool, &owner, project.id).await,
        Err(DomainError::NotFound(Resource::Project))
    ));
}

#[tokio::test]
async fn test_members_listed_in_join_order() {
    let Some(pool) = common::test_pool().await else { return };

    let owner = common::principal(&pool, "owner").await;
    let member = common::principal(&pool, "member").await;
    let outsider = common::principal(&pool, "outsider").await;
    let project = common::create_project(&pool, &owner, "Theta").await;
    common::join(&pool, project.id, &member, ProjectRole::Member).await;

    let members = service::list_members(&pool, &member, project.id).await.unwrap();
    assert_eq!(
        members.iter().map(|m| m.user_id).collect::<Vec<_>>(),
        vec![owner.user_id, member.user_id]
    );

    assert!(matches!(
        service::list_members(&pool, &outsider, project.id).await,
        Err(DomainError::NotFound(Resource::Project))
    ));
}

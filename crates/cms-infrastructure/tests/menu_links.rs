//! Menu/page association behaviour over the in-memory store.

use cms_core::domain::{MenuPatch, NewMenu, NewPage, PagePatch};
use cms_core::error::DomainError;
use cms_core::repositories::Repositories;
use cms_core::services::{MenuService, PageService};
use cms_infrastructure::InMemoryStore;

struct Fixture {
    repos: Repositories,
    menus: MenuService,
    pages: PageService,
}

fn fixture() -> Fixture {
    let repos = InMemoryStore::new().repositories();
    Fixture {
        menus: MenuService::new(repos.menus.clone(), repos.pages.clone(), repos.links.clone()),
        pages: PageService::new(repos.pages.clone(), repos.links.clone()),
        repos,
    }
}

async fn page(f: &Fixture, slug: &str) -> String {
    f.repos
        .pages
        .create(NewPage {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            published: true,
            ..NewPage::default()
        })
        .await
        .unwrap()
        .id
}

async fn menu(f: &Fixture, label: &str) -> String {
    f.repos
        .menus
        .create(NewMenu {
            label: label.to_string(),
            ..NewMenu::default()
        })
        .await
        .unwrap()
        .id
}

async fn menu_pages(f: &Fixture, menu_id: &str) -> Vec<String> {
    f.repos.menus.find_by_id(menu_id).await.unwrap().unwrap().pages
}

async fn page_menu(f: &Fixture, page_id: &str) -> Option<String> {
    f.repos.pages.find_by_id(page_id).await.unwrap().unwrap().menu_id
}

#[tokio::test]
async fn adding_a_page_links_both_sides() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;

    let updated = f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert_eq!(updated.pages, vec![sqli.clone()]);
    assert_eq!(page_menu(&f, &sqli).await, Some(hacking));
}

#[tokio::test]
async fn adding_twice_keeps_one_entry() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;

    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert_eq!(menu_pages(&f, &hacking).await, vec![sqli]);
}

#[tokio::test]
async fn adding_to_another_menu_moves_the_page() {
    let f = fixture();
    let web = menu(&f, "Web").await;
    let cloud = menu(&f, "Cloud").await;
    let ssrf = page(&f, "ssrf").await;

    f.menus.add_page_to_menu(&web, &ssrf).await.unwrap();
    f.menus.add_page_to_menu(&cloud, &ssrf).await.unwrap();

    assert!(menu_pages(&f, &web).await.is_empty());
    assert_eq!(menu_pages(&f, &cloud).await, vec![ssrf.clone()]);
    assert_eq!(page_menu(&f, &ssrf).await, Some(cloud));
}

#[tokio::test]
async fn removing_a_page_clears_its_menu() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    let updated = f.menus.remove_page_from_menu(&hacking, &sqli).await.unwrap();

    assert!(updated.pages.is_empty());
    assert_eq!(page_menu(&f, &sqli).await, None);
}

#[tokio::test]
async fn unknown_ids_are_reported() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;

    let err = f.menus.add_page_to_menu("nope", &sqli).await.unwrap_err();
    assert!(matches!(err, DomainError::MenuNotFound(_)));

    let err = f.menus.add_page_to_menu(&hacking, "nope").await.unwrap_err();
    assert!(matches!(err, DomainError::PageNotFound(_)));

    let err = f.menus.move_page("nope", Some(hacking.as_str())).await.unwrap_err();
    assert!(matches!(err, DomainError::PageNotFound(_)));
}

#[tokio::test]
async fn page_update_with_menu_id_maintains_both_sides() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;

    f.repos
        .pages
        .update(&sqli, PagePatch::with_menu(Some(hacking.clone())))
        .await
        .unwrap();
    assert_eq!(menu_pages(&f, &hacking).await, vec![sqli.clone()]);

    f.repos
        .pages
        .update(&sqli, PagePatch::with_menu(None))
        .await
        .unwrap();
    assert!(menu_pages(&f, &hacking).await.is_empty());
    assert_eq!(page_menu(&f, &sqli).await, None);
}

#[tokio::test]
async fn moving_to_a_missing_menu_changes_nothing() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    let err = f.menus.move_page(&sqli, Some("gone")).await.unwrap_err();

    assert!(matches!(err, DomainError::MenuNotFound(_)));
    assert_eq!(menu_pages(&f, &hacking).await, vec![sqli.clone()]);
    assert_eq!(page_menu(&f, &sqli).await, Some(hacking));
}

#[tokio::test]
async fn menu_update_with_pages_relinks() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    let xss = page(&f, "xss").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    f.repos
        .menus
        .update(&hacking, MenuPatch::with_pages(vec![xss.clone()]))
        .await
        .unwrap();

    assert_eq!(page_menu(&f, &sqli).await, None);
    assert_eq!(page_menu(&f, &xss).await, Some(hacking.clone()));
    assert_eq!(menu_pages(&f, &hacking).await, vec![xss]);
}

#[tokio::test]
async fn deleting_a_page_through_the_service_detaches_it() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert!(f.pages.delete_page(&sqli).await.unwrap());

    assert!(menu_pages(&f, &hacking).await.is_empty());
    assert!(!f.pages.delete_page(&sqli).await.unwrap());
}

#[tokio::test]
async fn raw_page_delete_leaves_a_dangling_reference_that_can_be_detached() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert!(f.repos.pages.delete(&sqli).await.unwrap());
    assert_eq!(menu_pages(&f, &hacking).await, vec![sqli.clone()]);

    let menu = f.menus.remove_page_from_menu(&hacking, &sqli).await.unwrap();
    assert!(menu.pages.is_empty());
}

#[tokio::test]
async fn deleting_a_menu_through_the_service_frees_its_pages() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert!(f.menus.delete_menu(&hacking).await.unwrap());

    assert_eq!(page_menu(&f, &sqli).await, None);
    assert!(f.repos.menus.find_by_id(&hacking).await.unwrap().is_none());
    assert!(!f.menus.delete_menu(&hacking).await.unwrap());
}

#[tokio::test]
async fn raw_menu_delete_leaves_page_links_in_place() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    f.menus.add_page_to_menu(&hacking, &sqli).await.unwrap();

    assert!(f.repos.menus.delete(&hacking).await.unwrap());

    assert_eq!(page_menu(&f, &sqli).await, Some(hacking.clone()));
    assert!(!f.repos.menus.delete(&hacking).await.unwrap());
}

#[tokio::test]
async fn deleting_a_missing_page_or_menu_reports_false() {
    let f = fixture();
    assert!(!f.pages.delete_page("missing").await.unwrap());
    assert!(!f.menus.delete_menu("missing").await.unwrap());
}

#[tokio::test]
async fn navigation_follows_menu_list_order_and_skips_drafts() {
    let f = fixture();
    let hacking = menu(&f, "Hacking").await;
    let sqli = page(&f, "sqli").await;
    let xss = page(&f, "xss").await;
    let draft = f
        .repos
        .pages
        .create(NewPage {
            title: "Draft".into(),
            slug: "draft".into(),
            ..NewPage::default()
        })
        .await
        .unwrap()
        .id;

    for id in [&xss, &sqli, &draft] {
        f.menus.add_page_to_menu(&hacking, id).await.unwrap();
    }

    let navigation = f.menus.navigation().await.unwrap();
    assert_eq!(navigation.len(), 1);
    let slugs: Vec<&str> = navigation[0].pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["xss", "sqli"]);
}

#[tokio::test]
async fn open_page_counts_views_for_published_pages_only() {
    let f = fixture();
    let sqli = page(&f, "sqli").await;
    let draft = f
        .repos
        .pages
        .create(NewPage {
            title: "Draft".into(),
            slug: "draft".into(),
            ..NewPage::default()
        })
        .await
        .unwrap()
        .id;

    let opened = f.pages.open_page(&sqli).await.unwrap().unwrap();
    assert_eq!(opened.views, 0);
    f.pages.open_page(&draft).await.unwrap().unwrap();

    assert_eq!(f.repos.pages.find_by_id(&sqli).await.unwrap().unwrap().views, 1);
    assert_eq!(f.repos.pages.find_by_id(&draft).await.unwrap().unwrap().views, 0);
    assert!(f.pages.open_page("missing").await.unwrap().is_none());
}

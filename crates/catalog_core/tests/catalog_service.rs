use catalog_core::blob::{DEFAULT_PLACEHOLDER, PLACEHOLDER_NAME};
use catalog_core::db::open_pool_in_memory;
use catalog_core::{
    content_address, CatalogService, Category, FsImageStore, ImageStore, Item, ItemId,
    ItemRepository, ItemSummary, MemoryImageStore, NewItem, RepoError, RepoResult, ServiceError,
    SqliteItemRepository,
};
use std::fs;
use std::sync::Mutex;

const JACKET_IMAGE: &[u8] = b"\xff\xd8\xff\xe0jacket-jpeg-bytes";
const SCARF_IMAGE: &[u8] = b"\xff\xd8\xff\xe0scarf-jpeg-bytes";

struct Fixture {
    images_dir: tempfile::TempDir,
    service: CatalogService<SqliteItemRepository, FsImageStore>,
}

fn fixture() -> Fixture {
    let images_dir = tempfile::tempdir().unwrap();
    fs::write(images_dir.path().join(PLACEHOLDER_NAME), b"placeholder").unwrap();
    let repo = SqliteItemRepository::try_new(open_pool_in_memory().unwrap()).unwrap();
    let service = CatalogService::new(repo, FsImageStore::new(images_dir.path()));
    Fixture {
        images_dir,
        service,
    }
}

#[test]
fn submitted_item_reads_back_with_content_addressed_image() {
    let fx = fixture();

    let id = fx
        .service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();
    assert_eq!(id, 1);

    let item = fx.service.get_item(id).unwrap();
    assert_eq!(
        item,
        Item {
            id: 1,
            name: "jacket".to_string(),
            category: "fashion".to_string(),
            image_ref: Some(content_address(JACKET_IMAGE)),
        }
    );

    let stored = fs::read(fx.images_dir.path().join(content_address(JACKET_IMAGE))).unwrap();
    assert_eq!(stored, JACKET_IMAGE);
}

#[test]
fn second_submission_reuses_category() {
    let fx = fixture();
    fx.service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();
    fx.service
        .submit_item("scarf", "fashion", Some(SCARF_IMAGE))
        .unwrap();

    let categories = fx.service.list_categories().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "fashion");
}

#[test]
fn search_and_list_use_summary_projection() {
    let fx = fixture();
    fx.service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();

    let expected = vec![ItemSummary {
        name: "jacket".to_string(),
        category: "fashion".to_string(),
    }];
    assert_eq!(fx.service.search_items("jack").unwrap(), expected);
    assert!(fx.service.search_items("shoe").unwrap().is_empty());
    assert_eq!(fx.service.list_items().unwrap(), expected);
}

#[test]
fn identical_images_share_one_blob() {
    let fx = fixture();
    fx.service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();
    fx.service
        .submit_item("jacket again", "fashion", Some(JACKET_IMAGE))
        .unwrap();

    let first = fx.service.get_item(1).unwrap();
    let second = fx.service.get_item(2).unwrap();
    assert_eq!(first.image_ref, second.image_ref);

    let blobs = fs::read_dir(fx.images_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name() != PLACEHOLDER_NAME)
        .count();
    assert_eq!(blobs, 1);
}

#[test]
fn missing_item_is_not_found_client_fault() {
    let fx = fixture();

    let err = fx.service.get_item(999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(999)));
    assert!(err.is_client_fault());
}

#[test]
fn missing_image_payload_is_rejected_before_any_write() {
    let fx = fixture();

    let err = fx.service.submit_item("jacket", "fashion", None).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(fx.service.list_items().unwrap().is_empty());
    assert!(fx.service.list_categories().unwrap().is_empty());
}

#[test]
fn blank_name_is_rejected_before_image_is_stored() {
    let fx = fixture();

    let err = fx
        .service
        .submit_item("  ", "fashion", Some(JACKET_IMAGE))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(!fx
        .images_dir
        .path()
        .join(content_address(JACKET_IMAGE))
        .exists());
}

#[test]
fn unknown_image_serves_placeholder_and_bad_suffix_is_rejected() {
    let fx = fixture();

    let fetched = fx.service.get_image("missing.jpg").unwrap();
    assert!(fetched.placeholder);
    assert_eq!(fetched.bytes, b"placeholder");

    let err = fx.service.get_image("missing.png").unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(err.is_client_fault());
}

#[test]
fn fresh_image_directory_serves_builtin_placeholder() {
    let root = tempfile::tempdir().unwrap();
    let repo = SqliteItemRepository::try_new(open_pool_in_memory().unwrap()).unwrap();
    let service = CatalogService::new(repo, FsImageStore::new(root.path().join("images")));

    service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();

    let fetched = service.get_image("missing.jpg").unwrap();
    assert!(fetched.placeholder);
    assert_eq!(fetched.bytes, DEFAULT_PLACEHOLDER);
}

#[test]
fn stored_image_is_served_by_reference() {
    let fx = fixture();
    let id = fx
        .service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();
    let reference = fx.service.get_item(id).unwrap().image_ref.unwrap();

    let fetched = fx.service.get_image(&reference).unwrap();
    assert!(!fetched.placeholder);
    assert_eq!(fetched.bytes, JACKET_IMAGE);
}

/// In-memory repository double; `fail_writes` simulates a storage outage.
#[derive(Default)]
struct FakeItemRepository {
    items: Mutex<Vec<NewItem>>,
    fail_writes: bool,
}

impl ItemRepository for FakeItemRepository {
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        if self.fail_writes {
            return Err(RepoError::InvalidData(
                "disk I/O error at /var/lib/catalog".to_string(),
            ));
        }
        item.validate()?;
        let mut items = self.items.lock().unwrap();
        items.push(item.clone());
        Ok(items.len() as ItemId)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        let items = self.items.lock().unwrap();
        let index = usize::try_from(id - 1).map_err(|_| RepoError::NotFound(id))?;
        let item = items.get(index).ok_or(RepoError::NotFound(id))?;
        Ok(Item {
            id,
            name: item.name.clone(),
            category: item.category.clone(),
            image_ref: item.image_ref.clone(),
        })
    }

    fn list_items(&self) -> RepoResult<Vec<ItemSummary>> {
        self.search_items("")
    }

    fn search_items(&self, keyword: &str) -> RepoResult<Vec<ItemSummary>> {
        let keyword = keyword.to_ascii_lowercase();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.name.to_ascii_lowercase().contains(&keyword))
            .map(|item| ItemSummary {
                name: item.name.clone(),
                category: item.category.clone(),
            })
            .collect())
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        Ok(Vec::new())
    }
}

#[test]
fn service_runs_against_injected_fakes() {
    let images = MemoryImageStore::new(b"placeholder".to_vec());
    let service = CatalogService::new(FakeItemRepository::default(), &images);

    let id = service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap();
    assert_eq!(
        service.get_item(id).unwrap().image_ref,
        Some(content_address(JACKET_IMAGE))
    );
    assert_eq!(images.len(), 1);
    assert_eq!(images.get(&content_address(JACKET_IMAGE)).unwrap().bytes, JACKET_IMAGE);
}

#[test]
fn persistence_failure_hides_internal_detail() {
    let repo = FakeItemRepository {
        fail_writes: true,
        ..FakeItemRepository::default()
    };
    let service = CatalogService::new(repo, MemoryImageStore::new(Vec::new()));

    let err = service
        .submit_item("jacket", "fashion", Some(JACKET_IMAGE))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(_)));
    assert!(!err.is_client_fault());
    assert_eq!(err.public_message(), "internal server error");
    assert!(err.to_string().contains("/var/lib/catalog"));
}

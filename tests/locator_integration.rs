/*
 *  tests/locator_integration.rs
 *
 *  Integration tests for variant resolution and module loading
 *
 *  BoardWalk - the right module for the board
 *  (c) 2020-26 Stuart Hunter
 */

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use boardwalk::config::BoardProperties;
use boardwalk::module::error::LocateError;
use boardwalk::module::ffi::ModuleDescriptor;
use boardwalk::module::loader::{ImageLoader, ModuleImage, ModuleLoader};
use boardwalk::module::locator::{ModuleLocator, module_suffix};

static LED_DEFAULT: ModuleDescriptor =
    ModuleDescriptor::new("led", "Default LED", "tester");
static LED_TROUT: ModuleDescriptor =
    ModuleDescriptor::new("led", "Trout LED", "tester");
static LED_WRONG_ID: ModuleDescriptor =
    ModuleDescriptor::new("led2", "Mislabeled LED", "tester");

/// Observes the fake loading facility: every attempted open, every
/// open/close event, and a live handle count, standing in for the platform
/// loader's bookkeeping.
#[derive(Default)]
struct Probe {
    attempts: RefCell<Vec<String>>,
    events: RefCell<Vec<String>>,
    live: Cell<isize>,
}

impl Probe {
    fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

struct FakeImage {
    name: String,
    descriptor: &'static ModuleDescriptor,
    probe: Rc<Probe>,
}

impl ModuleImage for FakeImage {
    fn descriptor(&self, _symbol: &str) -> Result<*const ModuleDescriptor, String> {
        Ok(self.descriptor as *const ModuleDescriptor)
    }
}

impl Drop for FakeImage {
    fn drop(&mut self) {
        self.probe.events.borrow_mut().push(format!("close {}", self.name));
        self.probe.live.set(self.probe.live.get() - 1);
    }
}

/// Fake loading facility: a map from candidate file name to the descriptor
/// that file would export.
struct FakeLoader {
    images: HashMap<String, &'static ModuleDescriptor>,
    probe: Rc<Probe>,
}

impl ImageLoader for FakeLoader {
    type Image = FakeImage;

    fn open(&self, path: &Path) -> Result<FakeImage, String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.probe.attempts.borrow_mut().push(name.clone());

        match self.images.get(&name) {
            Some(descriptor) => {
                self.probe.events.borrow_mut().push(format!("open {}", name));
                self.probe.live.set(self.probe.live.get() + 1);
                Ok(FakeImage {
                    name,
                    descriptor,
                    probe: Rc::clone(&self.probe),
                })
            }
            None => Err(format!("{}: cannot open shared object file", path.display())),
        }
    }
}

fn module_file(id: &str, variant: &str) -> String {
    format!("{}.{}.{}", id, variant, module_suffix())
}

/// Locator over a fake facility holding `images`, with board properties
/// from `props`.
fn fake_locator(
    images: &[(&str, &'static ModuleDescriptor)],
    props: &[(&str, &str)],
) -> (ModuleLocator<FakeLoader>, Rc<Probe>) {
    let probe = Rc::new(Probe::default());
    let loader = FakeLoader {
        images: images
            .iter()
            .map(|(name, d)| (name.to_string(), *d))
            .collect(),
        probe: Rc::clone(&probe),
    };
    let store = BoardProperties::from_iter(props.iter().copied());
    let locator = ModuleLocator::with_loader(
        "/lib/boardwalk/modules",
        Box::new(store),
        ModuleLoader::with_image_loader(loader),
    );
    (locator, probe)
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_exhaustion_leaves_no_open_handles() {
    let (locator, probe) = fake_locator(&[], &[("board", "trout")]);

    let err = locator.locate("led").unwrap_err();
    assert!(matches!(err, LocateError::NotFound(_)));
    assert_eq!(probe.live.get(), 0);

    // arch is unset, so only board and default were ever tried, and
    // nothing was ever opened
    assert_eq!(
        probe.attempts(),
        vec![module_file("led", "trout"), module_file("led", "default")]
    );
    assert!(probe.events().is_empty());
}

#[test]
fn test_single_valid_candidate_succeeds() {
    let led_default = module_file("led", "default");
    let (locator, _probe) = fake_locator(&[(&led_default, &LED_DEFAULT)], &[]);

    let module = locator.locate("led").unwrap();
    assert_eq!(module.info().id, "led");
    assert_eq!(module.info().name, "Default LED");
}

#[test]
fn test_board_variant_wins_over_default() {
    let led_trout = module_file("led", "trout");
    let led_default = module_file("led", "default");
    let (locator, probe) = fake_locator(
        &[(&led_trout, &LED_TROUT), (&led_default, &LED_DEFAULT)],
        &[("board", "trout")],
    );

    let module = locator.locate("led").unwrap();
    assert_eq!(module.info().name, "Trout LED");

    // first success wins; the default candidate is never opened
    assert_eq!(probe.events(), vec![format!("open {}", led_trout)]);
}

#[test]
fn test_id_mismatch_closes_handle_and_continues() {
    let led_trout = module_file("led", "trout");
    let led_default = module_file("led", "default");
    let (locator, probe) = fake_locator(
        &[(&led_trout, &LED_WRONG_ID), (&led_default, &LED_DEFAULT)],
        &[("board", "trout")],
    );

    let module = locator.locate("led").unwrap();
    assert_eq!(module.info().id, "led");

    // the mismatched image was closed before the next candidate was opened
    assert_eq!(
        probe.events(),
        vec![
            format!("open {}", led_trout),
            format!("close {}", led_trout),
            format!("open {}", led_default),
        ]
    );

    // only the returned module is still open
    assert_eq!(probe.live.get(), 1);
    drop(module);
    assert_eq!(probe.live.get(), 0);
}

#[test]
fn test_unavailable_property_skips_without_io() {
    let led_default = module_file("led", "default");
    // no board, no arch: the first two chain entries must not produce any
    // open attempt at all
    let (locator, probe) = fake_locator(&[(&led_default, &LED_DEFAULT)], &[]);

    let module = locator.locate("led").unwrap();
    assert_eq!(module.info().id, "led");

    // the skipped entries produced no loader traffic at all
    assert_eq!(probe.attempts(), vec![led_default.clone()]);
    assert_eq!(probe.events(), vec![format!("open {}", led_default)]);
}

#[test]
fn test_board_mismatch_arch_unset_default_wins() {
    // The canonical walk: board resolves but its module is mislabeled, arch
    // is unset and skipped, default validates.
    init_logs();

    let led_trout = module_file("led", "trout");
    let led_default = module_file("led", "default");
    let (locator, probe) = fake_locator(
        &[(&led_trout, &LED_WRONG_ID), (&led_default, &LED_DEFAULT)],
        &[("board", "trout")],
    );

    let module = locator.locate("led").unwrap();
    assert_eq!(module.info().id, "led");
    assert_eq!(module.info().name, "Default LED");

    // exactly two attempts: trout (rejected, closed), then default
    assert_eq!(
        probe.events(),
        vec![
            format!("open {}", led_trout),
            format!("close {}", led_trout),
            format!("open {}", led_default),
        ]
    );

    drop(module);
    assert_eq!(probe.live.get(), 0);
}

#[test]
fn test_locate_is_idempotent() {
    let led_default = module_file("led", "default");
    let (locator, probe) = fake_locator(&[(&led_default, &LED_DEFAULT)], &[]);

    let first = locator.locate("led").unwrap();
    let second = locator.locate("led").unwrap();
    assert_eq!(first.info(), second.info());

    drop(first);
    drop(second);
    assert_eq!(probe.live.get(), 0);
}

#[test]
fn test_invalid_id_never_touches_the_loader() {
    let led_default = module_file("led", "default");
    let (locator, probe) = fake_locator(&[(&led_default, &LED_DEFAULT)], &[]);

    let err = locator.locate("../led").unwrap_err();
    assert!(matches!(err, LocateError::InvalidId(_)));
    assert!(probe.attempts().is_empty());
}

#[test]
fn test_real_loader_exhausts_on_missing_files() {
    // End-to-end over the real dynamic loader: nothing installed, so every
    // candidate fails to open and the caller sees NotFound.
    let dir = tempfile::tempdir().unwrap();
    let locator = ModuleLocator::new(
        dir.path(),
        Box::new(BoardProperties::from_iter([("board", "trout")])),
    );

    let err = locator.locate("led").unwrap_err();
    assert!(matches!(err, LocateError::NotFound(_)));
}

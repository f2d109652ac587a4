// Copyright 2026 The Graft Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared demo contracts and implementations used across the test suite.
//!
//! `setup()` registers every fixture class in the pool and ships the
//! descriptor resources through a static classpath root, once per process.
//! Contracts are split by concern so tests stay independent of each other's
//! registry state: `Greeter` for the end-to-end scenarios, `Counter` for
//! injection and the synthesised adaptive proxy, `Tracer` for activation,
//! `AdminPort` for the administrative API.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Once};

use crate::error::{ExtensionError, Result};
use crate::{
    loader_for, Activate, ClassPath, ClassPool, Extension, ExtensionClass, ExtensionLoader,
    ExtensionPoint, SetterDef, Url,
};

// ---------------------------------------------------------------------------
// Greeter: the end-to-end contract (wrappers, adaptive class, injection).
// ---------------------------------------------------------------------------

pub trait Greeter: Extension + fmt::Debug {
    fn greet(&self, url: &Url, who: &str) -> Result<String>;

    /// A deliberately non-adaptive operation.
    fn farewell(&self) -> Result<String>;
}

impl ExtensionPoint for dyn Greeter {
    const POINT_NAME: &'static str = "org.apache.demo.Greeter";
    const DEFAULT_NAME: Option<&'static str> = Some("en");

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

#[derive(Default)]
pub struct EnGreeter {
    counter: Option<Arc<dyn Counter>>,
    shadow_counter: Option<Arc<dyn Counter>>,
}

impl fmt::Debug for EnGreeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnGreeter").finish()
    }
}

impl EnGreeter {
    pub fn set_counter(&mut self, counter: Arc<dyn Counter>) {
        self.counter = Some(counter);
    }

    pub fn set_shadow_counter(&mut self, counter: Arc<dyn Counter>) {
        self.shadow_counter = Some(counter);
    }

    pub fn counter(&self) -> Option<&Arc<dyn Counter>> {
        self.counter.as_ref()
    }

    pub fn shadow_counter(&self) -> Option<&Arc<dyn Counter>> {
        self.shadow_counter.as_ref()
    }
}

impl Greeter for EnGreeter {
    fn greet(&self, _url: &Url, who: &str) -> Result<String> {
        Ok(format!("hello {}", who))
    }
    fn farewell(&self) -> Result<String> {
        Ok("bye".to_string())
    }
}

#[derive(Debug)]
pub struct FrGreeter;

impl Greeter for FrGreeter {
    fn greet(&self, _url: &Url, who: &str) -> Result<String> {
        Ok(format!("bonjour {}", who))
    }
    fn farewell(&self) -> Result<String> {
        Ok("au revoir".to_string())
    }
}

/// Decorator: tags every greeting so call-through is observable.
pub struct LoggingGreeterWrapper {
    pub inner: Arc<dyn Greeter>,
}

impl fmt::Debug for LoggingGreeterWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGreeterWrapper").finish()
    }
}

impl Greeter for LoggingGreeterWrapper {
    fn greet(&self, url: &Url, who: &str) -> Result<String> {
        Ok(format!("log({})", self.inner.greet(url, who)?))
    }
    fn farewell(&self) -> Result<String> {
        self.inner.farewell()
    }
}

/// Second decorator, discovered after the logging one.
pub struct TimingGreeterWrapper {
    pub inner: Arc<dyn Greeter>,
}

impl fmt::Debug for TimingGreeterWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingGreeterWrapper").finish()
    }
}

impl Greeter for TimingGreeterWrapper {
    fn greet(&self, url: &Url, who: &str) -> Result<String> {
        Ok(format!("timed({})", self.inner.greet(url, who)?))
    }
    fn farewell(&self) -> Result<String> {
        self.inner.farewell()
    }
}

/// The registered adaptive class of `Greeter`: dispatches `greet` on the
/// `greeter` url key and rejects the non-adaptive `farewell`.
#[derive(Debug)]
pub struct AdaptiveGreeter;

impl Greeter for AdaptiveGreeter {
    fn greet(&self, url: &Url, who: &str) -> Result<String> {
        let delegate = loader_for::<dyn Greeter>().adaptive_target(url, &["greeter"])?;
        delegate.greet(url, who)
    }
    fn farewell(&self) -> Result<String> {
        Err(ExtensionError::UnsupportedOperation {
            point: <dyn Greeter as ExtensionPoint>::POINT_NAME.to_string(),
            operation: "farewell".to_string(),
        })
    }
}

fn construct_en_greeter() -> Result<Box<dyn Greeter>> {
    Ok(Box::new(EnGreeter::default()))
}

fn construct_fr_greeter() -> Result<Box<dyn Greeter>> {
    Ok(Box::new(FrGreeter))
}

fn wrap_logging_greeter(inner: Arc<dyn Greeter>) -> Result<Box<dyn Greeter>> {
    Ok(Box::new(LoggingGreeterWrapper { inner }))
}

fn wrap_timing_greeter(inner: Arc<dyn Greeter>) -> Result<Box<dyn Greeter>> {
    Ok(Box::new(TimingGreeterWrapper { inner }))
}

fn construct_adaptive_greeter() -> Result<Box<dyn Greeter>> {
    Ok(Box::new(AdaptiveGreeter))
}

fn fetch_counter_proxy() -> Result<Box<dyn Any + Send + Sync>> {
    let proxy = loader_for::<dyn Counter>().get_adaptive()?;
    Ok(Box::new(proxy))
}

fn apply_counter(target: &mut dyn Any, value: Box<dyn Any + Send + Sync>) -> Result<()> {
    let greeter = target.downcast_mut::<EnGreeter>().ok_or_else(|| {
        ExtensionError::injection("org.apache.demo.EnGreeter", "counter", "target is not EnGreeter")
    })?;
    let counter = value.downcast::<Arc<dyn Counter>>().map_err(|_| {
        ExtensionError::injection("org.apache.demo.EnGreeter", "counter", "value is not a Counter")
    })?;
    greeter.set_counter(*counter);
    Ok(())
}

fn apply_shadow_counter(target: &mut dyn Any, value: Box<dyn Any + Send + Sync>) -> Result<()> {
    let greeter = target.downcast_mut::<EnGreeter>().ok_or_else(|| {
        ExtensionError::injection(
            "org.apache.demo.EnGreeter",
            "shadow_counter",
            "target is not EnGreeter",
        )
    })?;
    let counter = value.downcast::<Arc<dyn Counter>>().map_err(|_| {
        ExtensionError::injection(
            "org.apache.demo.EnGreeter",
            "shadow_counter",
            "value is not a Counter",
        )
    })?;
    greeter.set_shadow_counter(*counter);
    Ok(())
}

// ---------------------------------------------------------------------------
// Counter: injected collaborator with a synthesised adaptive proxy.
// ---------------------------------------------------------------------------

pub trait Counter: Extension {
    fn count(&self, url: &Url) -> Result<u64>;
}

struct CounterAdaptive {
    loader: Arc<ExtensionLoader<dyn Counter>>,
}

impl Counter for CounterAdaptive {
    fn count(&self, url: &Url) -> Result<u64> {
        let delegate = self.loader.adaptive_target(url, &["counter", "protocol"])?;
        delegate.count(url)
    }
}

impl ExtensionPoint for dyn Counter {
    const POINT_NAME: &'static str = "org.apache.demo.Counter";
    const DEFAULT_NAME: Option<&'static str> = Some("simple");

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }

    fn synthesize(loader: Arc<ExtensionLoader<Self>>) -> Result<Box<Self>> {
        Ok(Box::new(CounterAdaptive { loader }))
    }
}

pub struct SimpleCounter;

impl Counter for SimpleCounter {
    fn count(&self, _url: &Url) -> Result<u64> {
        Ok(1)
    }
}

pub struct StepCounter;

impl Counter for StepCounter {
    fn count(&self, _url: &Url) -> Result<u64> {
        Ok(10)
    }
}

/// Registered through a bare descriptor line; its name derives from the
/// class name.
pub struct NoopCounter;

impl Counter for NoopCounter {
    fn count(&self, _url: &Url) -> Result<u64> {
        Ok(0)
    }
}

fn construct_simple_counter() -> Result<Box<dyn Counter>> {
    Ok(Box::new(SimpleCounter))
}

fn construct_step_counter() -> Result<Box<dyn Counter>> {
    Ok(Box::new(StepCounter))
}

fn construct_noop_counter() -> Result<Box<dyn Counter>> {
    Ok(Box::new(NoopCounter))
}

// ---------------------------------------------------------------------------
// Tracer: activation metadata, construction failure, sticky adaptive error.
// ---------------------------------------------------------------------------

pub trait Tracer: Extension + fmt::Debug {
    fn kind(&self) -> &'static str;
}

impl ExtensionPoint for dyn Tracer {
    const POINT_NAME: &'static str = "org.apache.demo.Tracer";

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

macro_rules! tracer_impl {
    ($ty:ident, $kind:literal) => {
        #[derive(Debug)]
        pub struct $ty;
        impl Tracer for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }
        }
    };
}

tracer_impl!(ATracer, "a");
tracer_impl!(BTracer, "b");
tracer_impl!(CTracer, "c");
tracer_impl!(CachedTracer, "cached");

#[derive(Debug)]
pub struct FaultyTracer;

impl Tracer for FaultyTracer {
    fn kind(&self) -> &'static str {
        "faulty"
    }
}

fn construct_a_tracer() -> Result<Box<dyn Tracer>> {
    Ok(Box::new(ATracer))
}

fn construct_b_tracer() -> Result<Box<dyn Tracer>> {
    Ok(Box::new(BTracer))
}

fn construct_c_tracer() -> Result<Box<dyn Tracer>> {
    Ok(Box::new(CTracer))
}

fn construct_cached_tracer() -> Result<Box<dyn Tracer>> {
    Ok(Box::new(CachedTracer))
}

fn construct_faulty_tracer() -> Result<Box<dyn Tracer>> {
    Err(ExtensionError::usage("FaultyTracer refuses to start"))
}

// ---------------------------------------------------------------------------
// AdminPort: administrative add / replace.
// ---------------------------------------------------------------------------

pub trait AdminPort: Extension {
    fn tag(&self) -> &'static str;
}

impl ExtensionPoint for dyn AdminPort {
    const POINT_NAME: &'static str = "org.apache.demo.AdminPort";

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

pub struct BaseAdminPort;

impl AdminPort for BaseAdminPort {
    fn tag(&self) -> &'static str {
        "base"
    }
}

pub struct ExtraAdminPort;

impl AdminPort for ExtraAdminPort {
    fn tag(&self) -> &'static str {
        "extra"
    }
}

pub struct PatchedAdminPort;

impl AdminPort for PatchedAdminPort {
    fn tag(&self) -> &'static str {
        "patched"
    }
}

fn construct_base_admin_port() -> Result<Box<dyn AdminPort>> {
    Ok(Box::new(BaseAdminPort))
}

pub fn extra_admin_port_class() -> ExtensionClass<dyn AdminPort> {
    ExtensionClass::ordinary::<ExtraAdminPort>("org.apache.demo.ExtraAdminPort", || {
        Ok(Box::new(ExtraAdminPort))
    })
}

pub fn patched_admin_port_class() -> ExtensionClass<dyn AdminPort> {
    ExtensionClass::ordinary::<PatchedAdminPort>("org.apache.demo.PatchedAdminPort", || {
        Ok(Box::new(PatchedAdminPort))
    })
}

// ---------------------------------------------------------------------------
// ProbePort / ResetPort: cache-state probing and loader reset, kept apart so
// no other test perturbs their registry state.
// ---------------------------------------------------------------------------

pub trait ProbePort: Extension {
    fn ping(&self) -> &'static str;
}

impl ExtensionPoint for dyn ProbePort {
    const POINT_NAME: &'static str = "org.apache.demo.ProbePort";

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

pub struct PlainProbePort;

impl ProbePort for PlainProbePort {
    fn ping(&self) -> &'static str {
        "pong"
    }
}

pub trait ResetPort: Extension {
    fn ping(&self) -> &'static str;
}

impl ExtensionPoint for dyn ResetPort {
    const POINT_NAME: &'static str = "org.apache.demo.ResetPort";

    fn as_any(instance: &Self) -> &dyn Any {
        instance
    }
    fn as_any_mut(instance: &mut Self) -> &mut dyn Any {
        instance
    }
}

pub struct PlainResetPort;

impl ResetPort for PlainResetPort {
    fn ping(&self) -> &'static str {
        "pong"
    }
}

// ---------------------------------------------------------------------------
// Descriptor resources and registration.
// ---------------------------------------------------------------------------

static DESCRIPTORS: &[(&str, &str)] = &[
    (
        "META-INF/dubbo/org.apache.demo.Greeter",
        "# demo greeters\n\
         en,english=org.apache.demo.EnGreeter\n\
         fr=org.apache.demo.FrGreeter\n\
         logging=org.apache.demo.LoggingGreeterWrapper\n\
         org.apache.demo.TimingGreeterWrapper\n\
         org.apache.demo.AdaptiveGreeter\n\
         broken=org.apache.demo.NoSuchGreeter\n",
    ),
    // Written under the older vendor namespace on purpose.
    (
        "META-INF/dubbo/com.alibaba.demo.Counter",
        "simple,basic=org.apache.demo.SimpleCounter\n\
         step=org.apache.demo.StepCounter\n\
         org.apache.demo.NoopCounter\n",
    ),
    (
        "META-INF/dubbo/internal/org.apache.demo.Tracer",
        "a=org.apache.demo.ATracer\n\
         b=org.apache.demo.BTracer\n\
         c=org.apache.demo.CTracer\n\
         cached=org.apache.demo.CachedTracer\n\
         faulty=org.apache.demo.FaultyTracer\n",
    ),
    (
        "META-INF/services/org.apache.demo.AdminPort",
        "base=org.apache.demo.BaseAdminPort\n",
    ),
    (
        "META-INF/dubbo/org.apache.demo.ProbePort",
        "p=org.apache.demo.PlainProbePort\n",
    ),
    (
        "META-INF/dubbo/org.apache.demo.ResetPort",
        "r=org.apache.demo.PlainResetPort\n",
    ),
];

/// Register every fixture class and descriptor resource, once per process.
pub fn setup() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();

        ClassPool::register(
            ExtensionClass::<dyn Greeter>::ordinary::<EnGreeter>(
                "org.apache.demo.EnGreeter",
                construct_en_greeter,
            )
            .with_setter(SetterDef::new(
                "counter",
                <dyn Counter as ExtensionPoint>::POINT_NAME,
                fetch_counter_proxy,
                apply_counter,
            ))
            .with_setter(
                SetterDef::new(
                    "shadow_counter",
                    <dyn Counter as ExtensionPoint>::POINT_NAME,
                    fetch_counter_proxy,
                    apply_shadow_counter,
                )
                .disabled(),
            ),
        );
        ClassPool::register(ExtensionClass::<dyn Greeter>::ordinary::<FrGreeter>(
            "org.apache.demo.FrGreeter",
            construct_fr_greeter,
        ));
        ClassPool::register(ExtensionClass::<dyn Greeter>::wrapper::<LoggingGreeterWrapper>(
            "org.apache.demo.LoggingGreeterWrapper",
            wrap_logging_greeter,
        ));
        ClassPool::register(ExtensionClass::<dyn Greeter>::wrapper::<TimingGreeterWrapper>(
            "org.apache.demo.TimingGreeterWrapper",
            wrap_timing_greeter,
        ));
        ClassPool::register(ExtensionClass::<dyn Greeter>::adaptive::<AdaptiveGreeter>(
            "org.apache.demo.AdaptiveGreeter",
            construct_adaptive_greeter,
        ));

        ClassPool::register(ExtensionClass::<dyn Counter>::ordinary::<SimpleCounter>(
            "org.apache.demo.SimpleCounter",
            construct_simple_counter,
        ));
        ClassPool::register(ExtensionClass::<dyn Counter>::ordinary::<StepCounter>(
            "org.apache.demo.StepCounter",
            construct_step_counter,
        ));
        ClassPool::register(ExtensionClass::<dyn Counter>::ordinary::<NoopCounter>(
            "org.apache.demo.NoopCounter",
            construct_noop_counter,
        ));

        ClassPool::register(
            ExtensionClass::<dyn Tracer>::ordinary::<ATracer>(
                "org.apache.demo.ATracer",
                construct_a_tracer,
            )
            .with_activate(Activate::new().with_group("provider").with_order(1)),
        );
        ClassPool::register(
            ExtensionClass::<dyn Tracer>::ordinary::<BTracer>(
                "org.apache.demo.BTracer",
                construct_b_tracer,
            )
            .with_activate(Activate::new().with_group("provider").with_order(2)),
        );
        ClassPool::register(ExtensionClass::<dyn Tracer>::ordinary::<CTracer>(
            "org.apache.demo.CTracer",
            construct_c_tracer,
        ));
        ClassPool::register(
            ExtensionClass::<dyn Tracer>::ordinary::<CachedTracer>(
                "org.apache.demo.CachedTracer",
                construct_cached_tracer,
            )
            .with_activate(
                Activate::new()
                    .with_group("consumer")
                    .with_key("cache")
                    .with_order(0),
            ),
        );
        ClassPool::register(ExtensionClass::<dyn Tracer>::ordinary::<FaultyTracer>(
            "org.apache.demo.FaultyTracer",
            construct_faulty_tracer,
        ));

        ClassPool::register(ExtensionClass::<dyn AdminPort>::ordinary::<BaseAdminPort>(
            "org.apache.demo.BaseAdminPort",
            construct_base_admin_port,
        ));

        ClassPool::register(ExtensionClass::<dyn ProbePort>::ordinary::<PlainProbePort>(
            "org.apache.demo.PlainProbePort",
            || Ok(Box::new(PlainProbePort)),
        ));
        ClassPool::register(ExtensionClass::<dyn ResetPort>::ordinary::<PlainResetPort>(
            "org.apache.demo.PlainResetPort",
            || Ok(Box::new(PlainResetPort)),
        ));

        ClassPath::global().add_static(DESCRIPTORS);
    });
}

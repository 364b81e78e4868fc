// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. The hosting Activity must be an
// `androidx.activity.ComponentActivity` and the app must bundle
// `androidx.browser` (Auth Tab) and the glue class in
// `java/tools/websession/NativeResultCallback.java`.
//
// ## Architecture notes
//
// `ActivityResultRegistry.register` needs a Java `ActivityResultCallback`.
// The glue class carries a `long` handle and forwards `onActivityResult` to
// the exported native method below, which looks the handle up in a
// process-wide table and runs the Rust handler. Unregistering a launcher
// removes its table entry, so late callbacks find nothing and are dropped.
//
// App classes (androidx, the glue) are loaded through the Activity's class
// loader because `FindClass` on a native-attached thread only sees the
// system class loader.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jlong;
use jni::{JNIEnv, JavaVM};

use websession_core::error::{Result, WebAuthError};
use websession_core::{
    ActivityResult, AuthTabIntent, RequestKey, ResultIntent, Url, RESULT_UNKNOWN_CODE,
};

use crate::traits::{PresentationHost, PresentationSurface, ResultHandler, ResultLauncher};

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Java glue class implementing `ActivityResultCallback<ActivityResult>`.
const CALLBACK_CLASS: &str = "tools.websession.NativeResultCallback";
const COMPONENT_ACTIVITY_CLASS: &str = "androidx.activity.ComponentActivity";
const START_FOR_RESULT_CLASS: &str =
    "androidx.activity.result.contract.ActivityResultContracts$StartActivityForResult";
const AUTH_TAB_BUILDER_CLASS: &str = "androidx.browser.auth.AuthTabIntent$Builder";

const SIG_REGISTER: &str = "(Ljava/lang/String;\
    Landroidx/activity/result/contract/ActivityResultContract;\
    Landroidx/activity/result/ActivityResultCallback;)\
    Landroidx/activity/result/ActivityResultLauncher;";
const SIG_LAUNCH_SCHEME: &str = "(Landroidx/activity/result/ActivityResultLauncher;\
    Landroid/net/Uri;Ljava/lang/String;)V";
const SIG_LAUNCH_HTTPS: &str = "(Landroidx/activity/result/ActivityResultLauncher;\
    Landroid/net/Uri;Ljava/lang/String;Ljava/lang/String;)V";

/// Obtain the process [`JavaVM`] set by the NDK glue code.
fn java_vm() -> Result<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| WebAuthError::Platform(format!("failed to obtain JavaVM: {e}")))
}

/// Map a JNI failure into `WebAuthError::Platform`, clearing any pending
/// Java exception so the thread can keep making JNI calls.
fn jni_err(env: &mut JNIEnv, context: &str, e: jni::errors::Error) -> WebAuthError {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    WebAuthError::Platform(format!("{context}: {e}"))
}

/// Local references one JNI call may create before its frame is popped.
const LOCAL_FRAME_CAPACITY: i32 = 32;

/// Attach the current thread for the duration of `f` and run it inside a
/// fresh local reference frame.
///
/// Every local reference `f` creates is freed when the frame pops, so only
/// `GlobalRef`s may escape. A thread that was already attached stays
/// attached, and its locals would otherwise live until it detaches.
fn with_jni<T>(context: &str, f: impl FnOnce(&mut JNIEnv) -> Result<T>) -> Result<T> {
    let vm = java_vm()?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| WebAuthError::Platform(format!("failed to attach JNI thread: {e}")))?;
    match env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| {
        Ok::<_, jni::errors::Error>(f(env))
    }) {
        Ok(result) => result,
        Err(e) => Err(jni_err(&mut env, context, e)),
    }
}

/// Load an app class through the Activity's class loader.
fn load_class<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    name: &str,
) -> Result<JClass<'local>> {
    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .map_err(|e| jni_err(env, "getClassLoader", e))?
        .l()
        .map_err(|e| jni_err(env, "getClassLoader->l", e))?;
    let j_name = env
        .new_string(name)
        .map_err(|e| jni_err(env, "new_string(class name)", e))?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&j_name)],
        )
        .map_err(|e| jni_err(env, name, e))?
        .l()
        .map_err(|e| jni_err(env, "loadClass->l", e))?;
    Ok(JClass::from(class))
}

/// `android.net.Uri.parse(url)`.
fn parse_uri<'local>(env: &mut JNIEnv<'local>, url: &Url) -> Result<JObject<'local>> {
    let j_url = env
        .new_string(url.as_str())
        .map_err(|e| jni_err(env, "new_string(url)", e))?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_url)],
    )
    .map_err(|e| jni_err(env, "Uri.parse", e))?
    .l()
    .map_err(|e| jni_err(env, "Uri.parse->l", e))
}

// ---------------------------------------------------------------------------
// Handler table
// ---------------------------------------------------------------------------

static NEXT_HANDLE: AtomicI64 = AtomicI64::new(1);

fn handlers() -> &'static Mutex<HashMap<jlong, ResultHandler>> {
    static HANDLERS: OnceLock<Mutex<HashMap<jlong, ResultHandler>>> = OnceLock::new();
    HANDLERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn insert_handler(handler: ResultHandler) -> jlong {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(handle, handler);
    handle
}

fn remove_handler(handle: jlong) -> Option<ResultHandler> {
    handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(&handle)
}

fn lookup_handler(handle: jlong) -> Option<ResultHandler> {
    handlers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&handle)
        .cloned()
}

// ---------------------------------------------------------------------------
// Native callback entry point
// ---------------------------------------------------------------------------

/// Called by `NativeResultCallback.onActivityResult` on the main thread.
#[unsafe(no_mangle)]
pub extern "system" fn Java_tools_websession_NativeResultCallback_nativeOnActivityResult(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    result: JObject,
) {
    let Some(handler) = lookup_handler(handle) else {
        tracing::debug!(handle, "activity result for an unregistered handler");
        return;
    };

    let result = match read_activity_result(&mut env, &result) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(handle, error = %e, "could not read activity result");
            ActivityResult {
                result_code: RESULT_UNKNOWN_CODE,
                data: None,
            }
        }
    };
    handler(result);
}

/// Copy an `androidx.activity.result.ActivityResult` into Rust.
fn read_activity_result(env: &mut JNIEnv, result: &JObject) -> Result<ActivityResult> {
    let result_code = env
        .call_method(result, "getResultCode", "()I", &[])
        .map_err(|e| jni_err(env, "getResultCode", e))?
        .i()
        .map_err(|e| jni_err(env, "getResultCode->i", e))?;

    let intent = env
        .call_method(result, "getData", "()Landroid/content/Intent;", &[])
        .map_err(|e| jni_err(env, "ActivityResult.getData", e))?
        .l()
        .map_err(|e| jni_err(env, "ActivityResult.getData->l", e))?;
    if intent.is_null() {
        return Ok(ActivityResult {
            result_code,
            data: None,
        });
    }

    let description = object_to_string(env, &intent)?;
    let uri = env
        .call_method(&intent, "getData", "()Landroid/net/Uri;", &[])
        .map_err(|e| jni_err(env, "Intent.getData", e))?
        .l()
        .map_err(|e| jni_err(env, "Intent.getData->l", e))?;
    let data_uri = if uri.is_null() {
        None
    } else {
        Some(object_to_string(env, &uri)?)
    };

    Ok(ActivityResult {
        result_code,
        data: Some(ResultIntent {
            data_uri,
            description,
        }),
    })
}

fn object_to_string(env: &mut JNIEnv, obj: &JObject) -> Result<String> {
    let j_str = env
        .call_method(obj, "toString", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err(env, "toString", e))?
        .l()
        .map_err(|e| jni_err(env, "toString->l", e))?;
    let j_str = JString::from(j_str);
    let text = env
        .get_string(&j_str)
        .map_err(|e| jni_err(env, "get_string", e))?;
    Ok(text.into())
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Android implementation of [`PresentationHost`].
///
/// The foreground surface is the Activity published through `ndk_context`.
pub struct AndroidHost;

impl AndroidHost {
    /// Create a new Android host.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily when
    /// a surface is requested.
    pub fn new() -> Self {
        Self
    }

    fn resolve_activity(&self) -> Result<Option<GlobalRef>> {
        let ctx = ndk_context::android_context();
        let ptr = ctx.context();
        if ptr.is_null() {
            return Ok(None);
        }

        with_jni("resolve foreground Activity", |env| {
            // SAFETY: the NDK guarantees this pointer is a valid global jobject
            // for the hosting Activity. The wrapper does not own it and is never
            // deleted.
            let activity = unsafe { JObject::from_raw(ptr.cast()) };

            let component_class = load_class(env, &activity, COMPONENT_ACTIVITY_CLASS)?;
            let usable = env
                .is_instance_of(&activity, &component_class)
                .map_err(|e| jni_err(env, "is_instance_of(ComponentActivity)", e))?;
            if !usable {
                tracing::warn!("hosting Activity is not a ComponentActivity");
                return Ok(None);
            }

            env.new_global_ref(&activity)
                .map(Some)
                .map_err(|e| jni_err(env, "new_global_ref(activity)", e))
        })
    }
}

impl Default for AndroidHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationHost for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn foreground_surface(&self) -> Option<Arc<dyn PresentationSurface>> {
        match self.resolve_activity() {
            Ok(Some(activity)) => Some(Arc::new(AndroidSurface { activity })),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Android: could not resolve the foreground Activity");
                None
            }
        }
    }
}

/// The hosting `ComponentActivity` and its activity-result registry.
struct AndroidSurface {
    activity: GlobalRef,
}

impl AndroidSurface {
    fn register_launcher(&self, env: &mut JNIEnv, key: &RequestKey, handle: jlong) -> Result<GlobalRef> {
        let activity = self.activity.as_obj();

        let registry = env
            .call_method(
                activity,
                "getActivityResultRegistry",
                "()Landroidx/activity/result/ActivityResultRegistry;",
                &[],
            )
            .map_err(|e| jni_err(env, "getActivityResultRegistry", e))?
            .l()
            .map_err(|e| jni_err(env, "getActivityResultRegistry->l", e))?;

        let contract_class = load_class(env, activity, START_FOR_RESULT_CLASS)?;
        let contract = env
            .new_object(&contract_class, "()V", &[])
            .map_err(|e| jni_err(env, "new StartActivityForResult", e))?;

        let callback_class = load_class(env, activity, CALLBACK_CLASS)?;
        let callback = env
            .new_object(&callback_class, "(J)V", &[JValue::Long(handle)])
            .map_err(|e| jni_err(env, "new NativeResultCallback", e))?;

        let j_key = env
            .new_string(key.as_str())
            .map_err(|e| jni_err(env, "new_string(key)", e))?;

        let launcher = env
            .call_method(
                &registry,
                "register",
                SIG_REGISTER,
                &[
                    JValue::Object(&j_key),
                    JValue::Object(&contract),
                    JValue::Object(&callback),
                ],
            )
            .map_err(|e| jni_err(env, "ActivityResultRegistry.register", e))?
            .l()
            .map_err(|e| jni_err(env, "register->l", e))?;

        env.new_global_ref(&launcher)
            .map_err(|e| jni_err(env, "new_global_ref(launcher)", e))
    }
}

impl PresentationSurface for AndroidSurface {
    fn register(&self, key: &RequestKey, handler: ResultHandler) -> Result<Box<dyn ResultLauncher>> {
        let handle = insert_handler(handler);
        let registered = with_jni("ActivityResultRegistry.register", |env| {
            self.register_launcher(env, key, handle)
        });
        match registered {
            Ok(launcher) => {
                tracing::debug!(%key, handle, "Android: activity result handler registered");
                Ok(Box::new(AndroidLauncher {
                    key: key.clone(),
                    activity: self.activity.clone(),
                    launcher,
                    handle,
                    unregistered: false,
                }))
            }
            Err(e) => {
                remove_handler(handle);
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Launcher: androidx.browser.auth.AuthTabIntent
// ---------------------------------------------------------------------------

struct AndroidLauncher {
    key: RequestKey,
    activity: GlobalRef,
    launcher: GlobalRef,
    handle: jlong,
    unregistered: bool,
}

impl AndroidLauncher {
    /// Build the `AuthTabIntent` and run `launch` with the given overload.
    fn launch(&self, intent: &AuthTabIntent, url: &Url, sig: &str, targets: &[&str]) -> Result<()> {
        with_jni("AuthTabIntent.launch", |env| self.launch_in_frame(env, intent, url, sig, targets))
    }

    fn launch_in_frame(
        &self,
        env: &mut JNIEnv,
        intent: &AuthTabIntent,
        url: &Url,
        sig: &str,
        targets: &[&str],
    ) -> Result<()> {
        let builder_class = load_class(env, self.activity.as_obj(), AUTH_TAB_BUILDER_CLASS)?;
        let builder = env
            .new_object(&builder_class, "()V", &[])
            .map_err(|e| jni_err(env, "new AuthTabIntent.Builder", e))?;
        if intent.ephemeral_browsing {
            env.call_method(
                &builder,
                "setEphemeralBrowsingEnabled",
                "(Z)Landroidx/browser/auth/AuthTabIntent$Builder;",
                &[JValue::Bool(1)],
            )
            .map_err(|e| jni_err(env, "setEphemeralBrowsingEnabled", e))?;
        }
        let auth_tab = env
            .call_method(&builder, "build", "()Landroidx/browser/auth/AuthTabIntent;", &[])
            .map_err(|e| jni_err(env, "AuthTabIntent.Builder.build", e))?
            .l()
            .map_err(|e| jni_err(env, "build->l", e))?;

        let uri = parse_uri(env, url)?;

        let mut j_targets = Vec::with_capacity(targets.len());
        for target in targets {
            let j_target = env
                .new_string(target)
                .map_err(|e| jni_err(env, "new_string(callback)", e))?;
            j_targets.push(JObject::from(j_target));
        }

        let mut args = vec![
            JValue::Object(self.launcher.as_obj()),
            JValue::Object(&uri),
        ];
        args.extend(j_targets.iter().map(JValue::Object));

        env.call_method(&auth_tab, "launch", sig, &args)
            .map_err(|e| jni_err(env, "AuthTabIntent.launch", e))?;

        tracing::info!(key = %self.key, "Android: Auth Tab launched");
        Ok(())
    }
}

impl ResultLauncher for AndroidLauncher {
    fn key(&self) -> &RequestKey {
        &self.key
    }

    fn launch_custom_scheme(&self, intent: &AuthTabIntent, url: &Url, scheme: &str) -> Result<()> {
        self.launch(intent, url, SIG_LAUNCH_SCHEME, &[scheme])
    }

    fn launch_https(&self, intent: &AuthTabIntent, url: &Url, host: &str, path: &str) -> Result<()> {
        self.launch(intent, url, SIG_LAUNCH_HTTPS, &[host, path])
    }

    fn unregister(&mut self) {
        if self.unregistered {
            return;
        }
        self.unregistered = true;
        remove_handler(self.handle);

        let result = with_jni("ActivityResultLauncher.unregister", |env| {
            env.call_method(self.launcher.as_obj(), "unregister", "()V", &[])
                .map_err(|e| jni_err(env, "ActivityResultLauncher.unregister", e))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Android: unregister failed");
        }
    }
}

impl Drop for AndroidLauncher {
    fn drop(&mut self) {
        self.unregister();
    }
}

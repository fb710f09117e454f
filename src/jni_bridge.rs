// JNI entry points for by.bonenaut7.mediatransport4j
// Nothing may unwind or leave a half-built object across this boundary:
// every entry point resolves to null / false on failure.
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use jni::objects::{GlobalRef, JClass, JMethodID, JObject, JStaticMethodID, JValue};
use jni::signature::{Primitive, ReturnType};
use jni::sys::{jboolean, jint, jobject, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_8};
use jni::JNIEnv;

use crate::error::BridgeResult;
use crate::logging;
use crate::settings;
use crate::smtc::{build_snapshots, dispatch, NativePlatform, SessionAction, SessionSnapshot};

const ARRAY_LIST_CLASS: &str = "java/util/ArrayList";
const BYTE_BUFFER_CLASS: &str = "java/nio/ByteBuffer";
const SESSION_CLASS: &str = "by/bonenaut7/mediatransport4j/impl/windows/WindowsMediaSession";
const SESSION_CTOR_SIG: &str =
    "(ILjava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/nio/ByteBuffer;JJZ)V";

// Local references created per session: three strings, the byte array,
// the ByteBuffer and the session object
const LOCALS_PER_SESSION: i32 = 6;

/// Class and method handles, resolved once per process
struct JniRegistry {
    array_list: GlobalRef,
    array_list_ctor: JMethodID,
    array_list_add: JMethodID,
    byte_buffer: GlobalRef,
    byte_buffer_wrap: JStaticMethodID,
    session: GlobalRef,
    session_ctor: JMethodID,
}

static REGISTRY: OnceLock<JniRegistry> = OnceLock::new();

impl JniRegistry {
    fn get(env: &mut JNIEnv) -> BridgeResult<&'static JniRegistry> {
        if let Some(registry) = REGISTRY.get() {
            return Ok(registry);
        }

        let registry = Self::resolve(env)?;
        // A concurrent first call may have won; both resolved the same handles.
        Ok(REGISTRY.get_or_init(|| registry))
    }

    fn resolve(env: &mut JNIEnv) -> BridgeResult<Self> {
        tracing::debug!("resolving JNI class handles");

        let array_list = env.find_class(ARRAY_LIST_CLASS)?;
        let array_list_ctor = env.get_method_id(&array_list, "<init>", "(I)V")?;
        let array_list_add = env.get_method_id(&array_list, "add", "(Ljava/lang/Object;)Z")?;

        let byte_buffer = env.find_class(BYTE_BUFFER_CLASS)?;
        let byte_buffer_wrap =
            env.get_static_method_id(&byte_buffer, "wrap", "([B)Ljava/nio/ByteBuffer;")?;

        let session = env.find_class(SESSION_CLASS)?;
        let session_ctor = env.get_method_id(&session, "<init>", SESSION_CTOR_SIG)?;

        Ok(Self {
            array_list: env.new_global_ref(array_list)?,
            array_list_ctor,
            array_list_add,
            byte_buffer: env.new_global_ref(byte_buffer)?,
            byte_buffer_wrap,
            session: env.new_global_ref(session)?,
            session_ctor,
        })
    }
}

fn class_of<'a, 'local>(global: &'a GlobalRef) -> &'a JClass<'local> {
    let obj: &'a JObject<'local> = global.as_obj();
    obj.into()
}

/// Build `ArrayList<WindowsMediaSession>` from the snapshots
fn snapshots_to_java<'local>(
    env: &mut JNIEnv<'local>,
    snapshots: &[SessionSnapshot],
) -> BridgeResult<JObject<'local>> {
    let registry = JniRegistry::get(env)?;
    let capacity = jint::try_from(snapshots.len()).unwrap_or(jint::MAX);

    // SAFETY: constructor id resolved against this class with signature (I)V
    let list = unsafe {
        env.new_object_unchecked(
            class_of(&registry.array_list),
            registry.array_list_ctor,
            &[JValue::Int(capacity).as_jni()],
        )?
    };

    for snapshot in snapshots {
        env.with_local_frame(LOCALS_PER_SESSION, |env| -> BridgeResult<()> {
            let session = session_to_java(env, registry, snapshot)?;
            // SAFETY: add(Object)Z resolved against ArrayList
            unsafe {
                env.call_method_unchecked(
                    &list,
                    registry.array_list_add,
                    ReturnType::Primitive(Primitive::Boolean),
                    &[JValue::Object(&session).as_jni()],
                )?;
            }
            Ok(())
        })?;
    }

    Ok(list)
}

fn session_to_java<'local>(
    env: &mut JNIEnv<'local>,
    registry: &JniRegistry,
    snapshot: &SessionSnapshot,
) -> BridgeResult<JObject<'local>> {
    let source_app = env.new_string(&snapshot.source_app)?;
    let artist = env.new_string(&snapshot.artist)?;
    let title = env.new_string(&snapshot.title)?;
    let bytes = env.byte_array_from_slice(&snapshot.thumbnail)?;

    // SAFETY: wrap([B) resolved against ByteBuffer, returns an object
    let thumbnail = unsafe {
        env.call_static_method_unchecked(
            class_of(&registry.byte_buffer),
            registry.byte_buffer_wrap,
            ReturnType::Object,
            &[JValue::Object(&bytes).as_jni()],
        )?
        .l()?
    };

    let is_playing = if snapshot.is_playing { JNI_TRUE } else { JNI_FALSE };

    // SAFETY: arguments match SESSION_CTOR_SIG one to one
    let session = unsafe {
        env.new_object_unchecked(
            class_of(&registry.session),
            registry.session_ctor,
            &[
                JValue::Int(snapshot.index as jint).as_jni(),
                JValue::Object(&source_app).as_jni(),
                JValue::Object(&artist).as_jni(),
                JValue::Object(&title).as_jni(),
                JValue::Object(&thumbnail).as_jni(),
                JValue::Long(snapshot.duration_seconds).as_jni(),
                JValue::Long(snapshot.position_seconds).as_jni(),
                JValue::Bool(is_playing).as_jni(),
            ],
        )?
    };

    Ok(session)
}

/// Run `f`, turning a panic into `fallback`
fn guard_boundary<T>(entry: &'static str, fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!(entry, "panic caught at JNI boundary");
            fallback
        }
    }
}

/// Drop a Java exception left pending by a failed JNI call, so the caller
/// sees the plain null / false result.
fn clear_pending_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

fn parse_sessions(env: &mut JNIEnv) -> jobject {
    let settings = settings::current();
    let Some(snapshots) = build_snapshots(&NativePlatform::default(), &settings.timeouts) else {
        return JObject::null().into_raw();
    };

    match snapshots_to_java(env, &snapshots) {
        Ok(list) => list.into_raw(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to build Java session list");
            clear_pending_exception(env);
            JObject::null().into_raw()
        }
    }
}

fn run_action(index: jint, action: SessionAction) -> jboolean {
    let accepted = guard_boundary(action.name(), false, || {
        dispatch(
            &NativePlatform::default(),
            index,
            action,
            &settings::current().timeouts,
        )
    });

    if accepted {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    guard_boundary("JNI_OnLoad", (), || {
        logging::init(&settings::current().log_filter);
        tracing::debug!("mediatransport4j natives loaded");
    });
    JNI_VERSION_1_8
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaTransport_nParseSessions<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jobject {
    guard_boundary("nParseSessions", JObject::null().into_raw(), || {
        parse_sessions(&mut env)
    })
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nSwitchToNext<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::Next)
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nSwitchToPrevious<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::Previous)
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nPlay<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::Play)
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nPause<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::Pause)
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nTogglePlay<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::TogglePlayPause)
}

#[no_mangle]
pub extern "system" fn Java_by_bonenaut7_mediatransport4j_impl_windows_WindowsMediaSession_nStop<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    index: jint,
) -> jboolean {
    run_action(index, SessionAction::Stop)
}

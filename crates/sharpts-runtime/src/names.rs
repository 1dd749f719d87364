//! Well-known runtime helper names (spec.md §4.9). These are the only
//! strings the bytecode emitter is allowed to look up through a
//! [`crate::RuntimeDescriptor`] — collecting them in one module keeps the
//! emitter and the stub emitter from drifting out of sync on spelling.

pub const TO_NUMBER: &str = "ToNumber";
pub const TO_BOOLEAN: &str = "ToBoolean";
pub const TO_STRING_COERCE: &str = "ToStringCoerce";
pub const STRINGIFY: &str = "Stringify";

pub const ADD: &str = "Add";
pub const POW: &str = "Pow";
pub const JS_EQUALS: &str = "JsEquals";
pub const JS_STRICT_EQUALS: &str = "JsStrictEquals";

pub const GET_PROPERTY: &str = "GetProperty";
pub const SET_PROPERTY: &str = "SetProperty";
pub const GET_INDEX: &str = "GetIndex";
pub const SET_INDEX: &str = "SetIndex";
pub const GET_PRIVATE: &str = "GetPrivate";
pub const SET_PRIVATE: &str = "SetPrivate";
pub const DELETE_PROPERTY: &str = "DeleteProperty";

pub const INVOKE_VALUE: &str = "InvokeValue";

pub const NEW_ARRAY: &str = "NewArray";
pub const NEW_MAP: &str = "NewMap";
pub const NEW_SET: &str = "NewSet";
pub const NEW_WEAK_MAP: &str = "NewWeakMap";
pub const NEW_WEAK_SET: &str = "NewWeakSet";

pub const GET_ITERATOR_FUNCTION: &str = "GetIteratorFunction";
pub const INVOKE_ITERATOR_NEXT: &str = "InvokeIteratorNext";
pub const GET_ITERATOR_DONE: &str = "GetIteratorDone";
pub const GET_ITERATOR_VALUE: &str = "GetIteratorValue";
pub const ITERATOR_WRAPPER_NEW: &str = "IteratorWrapperNew";

pub const BIGINT_ADD: &str = "BigIntAdd";
pub const BIGINT_SUB: &str = "BigIntSub";
pub const BIGINT_MUL: &str = "BigIntMul";
pub const BIGINT_COMPARE: &str = "BigIntCompare";

pub const DATE_NOW: &str = "DateNow";
pub const DATE_PARSE: &str = "DateParse";
pub const DATE_NEW: &str = "DateNew";

pub const DYNAMIC_IMPORT: &str = "DynamicImport";

pub const CRYPTO_HASH: &str = "$Hash";
pub const CRYPTO_HMAC: &str = "$Hmac";
pub const CRYPTO_RANDOM_BYTES: &str = "randomBytes";
pub const CRYPTO_RANDOM_UUID: &str = "randomUUID";
pub const CRYPTO_RANDOM_INT: &str = "randomInt";

pub const URL_PARSE: &str = "UrlParse";
pub const URL_FORMAT: &str = "UrlFormat";
pub const URL_RESOLVE: &str = "UrlResolve";

pub const PROMISE_ALL: &str = "PromiseAll";
pub const PROMISE_RACE: &str = "PromiseRace";
pub const PROMISE_ALL_SETTLED: &str = "PromiseAllSettled";
pub const PROMISE_ANY: &str = "PromiseAny";
pub const PROMISE_FINALLY: &str = "PromiseFinally";

pub const WRAP_EXCEPTION: &str = "WrapException";

pub const CONSOLE_LOG: &str = "ConsoleLog";

pub const MAKE_CLOSURE: &str = "MakeClosure";
pub const NEW_OBJECT: &str = "NewObject";
pub const OBJECT_SPREAD: &str = "ObjectSpread";
pub const REGEX_NEW: &str = "RegexNew";
pub const IMPORT_META: &str = "ImportMeta";
pub const ENUM_KEYS: &str = "EnumKeys";

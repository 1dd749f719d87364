//! Populates a [`RuntimeDescriptor`] with the full runtime helper surface
//! (spec.md §4.9). This module owns the one place that decides a stub's
//! call shape; everything else just looks names up.

use crate::descriptor::{RuntimeDescriptor, Shape};
use crate::names as n;

fn fixed(arity: u8) -> Shape {
    Shape::Fixed(arity)
}

pub fn emit_stubs() -> RuntimeDescriptor {
    let mut d = RuntimeDescriptor::new();

    d.register(n::TO_NUMBER, fixed(1));
    d.register(n::TO_BOOLEAN, fixed(1));
    d.register(n::TO_STRING_COERCE, fixed(1));
    d.register(n::STRINGIFY, fixed(1));

    d.register(n::ADD, fixed(2));
    d.register(n::POW, fixed(2));
    d.register(n::JS_EQUALS, fixed(2));
    d.register(n::JS_STRICT_EQUALS, fixed(2));

    d.register(n::GET_PROPERTY, fixed(2));
    d.register(n::SET_PROPERTY, fixed(3));
    d.register(n::GET_INDEX, fixed(2));
    d.register(n::SET_INDEX, fixed(3));
    d.register(n::GET_PRIVATE, fixed(2));
    d.register(n::SET_PRIVATE, fixed(3));
    d.register(n::DELETE_PROPERTY, fixed(2));

    d.register(n::INVOKE_VALUE, Shape::Variadic);

    d.register(n::NEW_ARRAY, Shape::Variadic);
    d.register(n::NEW_MAP, fixed(0));
    d.register(n::NEW_SET, fixed(0));
    d.register(n::NEW_WEAK_MAP, fixed(0));
    d.register(n::NEW_WEAK_SET, fixed(0));

    d.register(n::GET_ITERATOR_FUNCTION, fixed(1));
    d.register(n::INVOKE_ITERATOR_NEXT, fixed(1));
    d.register(n::GET_ITERATOR_DONE, fixed(1));
    d.register(n::GET_ITERATOR_VALUE, fixed(1));
    d.register(n::ITERATOR_WRAPPER_NEW, fixed(1));

    d.register(n::BIGINT_ADD, fixed(2));
    d.register(n::BIGINT_SUB, fixed(2));
    d.register(n::BIGINT_MUL, fixed(2));
    d.register(n::BIGINT_COMPARE, fixed(2));

    d.register(n::DATE_NOW, fixed(0));
    d.register(n::DATE_PARSE, fixed(1));
    d.register(n::DATE_NEW, Shape::Variadic);

    d.register(n::DYNAMIC_IMPORT, fixed(1));

    d.register(n::CRYPTO_HASH, fixed(2));
    d.register(n::CRYPTO_HMAC, fixed(3));
    d.register(n::CRYPTO_RANDOM_BYTES, fixed(1));
    d.register(n::CRYPTO_RANDOM_UUID, fixed(0));
    d.register(n::CRYPTO_RANDOM_INT, fixed(2));

    d.register(n::URL_PARSE, fixed(1));
    d.register(n::URL_FORMAT, fixed(1));
    d.register(n::URL_RESOLVE, fixed(2));

    d.register(n::PROMISE_ALL, fixed(1));
    d.register(n::PROMISE_RACE, fixed(1));
    d.register(n::PROMISE_ALL_SETTLED, fixed(1));
    d.register(n::PROMISE_ANY, fixed(1));
    // `finally` lowers to a nested state machine (spec.md §4.9) that wraps
    // the awaited value/exception and re-throws after the handler runs; the
    // stub only needs to accept the promise and the handler thunk.
    d.register(n::PROMISE_FINALLY, fixed(2));

    d.register(n::WRAP_EXCEPTION, fixed(1));

    d.register(n::CONSOLE_LOG, Shape::Variadic);

    // Arrow/closure-expression value construction (spec.md §4.2/§4.6):
    // function pointer plus the display-class/`this` instance it's bound
    // to, or `null` for a closure that captures nothing.
    d.register(n::MAKE_CLOSURE, fixed(2));
    d.register(n::NEW_OBJECT, fixed(0));
    d.register(n::OBJECT_SPREAD, fixed(2));
    d.register(n::REGEX_NEW, fixed(1));
    d.register(n::IMPORT_META, fixed(0));
    d.register(n::ENUM_KEYS, fixed(1));

    d
}
